use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DocgenError {
	#[error("failed to read `{path}`")]
	#[diagnostic(code(docgen::io_error))]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed manifest `{path}` at line {line}: {reason}")]
	#[diagnostic(
		code(docgen::malformed_manifest),
		help("check that the manifest declares a `module` and well-formed `require` entries")
	)]
	MalformedManifest {
		path: PathBuf,
		line: usize,
		reason: String,
	},

	#[error("failed to parse sources in `{path}`: {reason}")]
	#[diagnostic(code(docgen::parse_failure))]
	ParseFailure { path: PathBuf, reason: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(docgen::config_parse),
		help("check that docgen.toml is valid TOML with an optional [scan] section")
	)]
	ConfigParse(String),

	#[error("template rendering failed: {0}")]
	#[diagnostic(code(docgen::template_render))]
	TemplateRender(String),

	#[error("failed to write output file `{path}`")]
	#[diagnostic(code(docgen::output))]
	Output {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write rendered output")]
	#[diagnostic(code(docgen::write))]
	Write(#[source] std::io::Error),

	#[error("failed to write rendered fragment: {0}")]
	#[diagnostic(code(docgen::fragment_sink))]
	FragmentSink(String),

	#[error("{0}")]
	#[diagnostic(code(docgen::scan))]
	Scan(#[related] ScanErrors),
}

impl DocgenError {
	/// Wrap an I/O error with the path it occurred on.
	pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}
}

/// Errors collected while recursing into sibling directories.
///
/// Every failing directory is kept together with its path so that a single
/// scan reports all problems at once. Nested aggregates are flattened on
/// insertion.
#[derive(Debug, Default)]
pub struct ScanErrors {
	errors: Vec<(PathBuf, DocgenError)>,
}

impl ScanErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Record the outcome of scanning `path`. Successful results are ignored.
	pub fn record(&mut self, path: &Path, result: DocgenResult<()>) {
		match result {
			Ok(()) => {}
			Err(DocgenError::Scan(nested)) => self.errors.extend(nested.errors),
			Err(error) => self.errors.push((path.to_path_buf(), error)),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn len(&self) -> usize {
		self.errors.len()
	}

	/// Failing directories paired with their errors, in scan order.
	pub fn entries(&self) -> impl Iterator<Item = (&Path, &DocgenError)> {
		self.errors.iter().map(|(path, error)| (path.as_path(), error))
	}

	pub fn iter(&self) -> impl Iterator<Item = &DocgenError> {
		self.errors.iter().map(|(_, error)| error)
	}

	/// Whether any recorded failure happened at or below `path`.
	pub fn contains_path(&self, path: &Path) -> bool {
		self.errors.iter().any(|(failed, _)| failed.starts_with(path))
	}

	/// Collapse into a result: `Ok` when nothing failed.
	pub fn into_result(self) -> DocgenResult<()> {
		if self.errors.is_empty() {
			Ok(())
		} else {
			Err(DocgenError::Scan(self))
		}
	}
}

impl fmt::Display for ScanErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} director", self.errors.len())?;
		if self.errors.len() == 1 {
			write!(f, "y")?;
		} else {
			write!(f, "ies")?;
		}
		write!(f, " failed to scan")?;
		for (path, error) in &self.errors {
			write!(f, "\n  {}: {error}", path.display())?;
		}
		Ok(())
	}
}

pub type DocgenResult<T> = Result<T, DocgenError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
