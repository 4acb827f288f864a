use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Serialize;

use crate::DocgenConfig;
use crate::DocgenError;
use crate::DocgenResult;
use crate::Module;
use crate::Package;
use crate::ScanMode;
use crate::ScanState;
use crate::Scanner;
use crate::Section;
use crate::filter::DefaultFilter;
use crate::filter::ScanFilter;
use crate::manifest::ManifestParser;
use crate::render::CommentRenderer;
use crate::source::SourceParser;

/// Default permission bits for generated files.
pub const DEFAULT_OUTPUT_MODE: u32 = 0o644;

/// Scans a project once and renders its modules and packages through
/// [`minijinja`] templates.
///
/// ```rust,no_run
/// use docgen_core::Generator;
///
/// let mut generator = Generator::new(".");
/// generator
/// 	.generate_file("readme.tmpl.md", "readme.md", 0o644)
/// 	.unwrap();
/// ```
pub struct Generator {
	scanner: Scanner,
	filter: Box<dyn ScanFilter>,
	mode: ScanMode,
	/// Template sources keyed by absolute path, loaded on first use.
	templates: HashMap<PathBuf, String>,
}

impl std::fmt::Debug for Generator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Generator")
			.field("scanner", &self.scanner)
			.field("mode", &self.mode)
			.field("templates", &self.templates.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

impl Generator {
	/// Create a generator rooted at `root`. An empty root, `.` or `./` means
	/// the current directory; relative roots are resolved against it. `.` and
	/// `..` components are removed so scanned directories stay below the root.
	pub fn new(root: impl AsRef<Path>) -> Self {
		let root = root.as_ref();
		let root = if is_empty_path(root) {
			current_dir()
		} else if root.is_absolute() {
			clean(root)
		} else {
			clean(&current_dir().join(root))
		};

		Self {
			scanner: Scanner::new(root),
			filter: Box::new(DefaultFilter),
			mode: ScanMode::ALL_DEEP,
			templates: HashMap::new(),
		}
	}

	/// Create a generator for `root` using the scan settings of `config`.
	pub fn from_config(root: impl AsRef<Path>, config: &DocgenConfig) -> DocgenResult<Self> {
		let mut generator = Self::new(root);
		let filter = config.scan.filter(generator.root())?;
		generator.filter = Box::new(filter);
		generator.mode = config.scan.mode();
		Ok(generator)
	}

	#[must_use]
	pub fn with_filter(mut self, filter: impl ScanFilter + 'static) -> Self {
		self.filter = Box::new(filter);
		self
	}

	/// Scan mode used by the implicit scan in [`Generator::generate`].
	#[must_use]
	pub fn with_mode(mut self, mode: ScanMode) -> Self {
		self.mode = mode;
		self
	}

	#[must_use]
	pub fn with_manifest_parser(mut self, parser: impl ManifestParser + 'static) -> Self {
		self.scanner = self.scanner.with_manifest_parser(parser);
		self
	}

	#[must_use]
	pub fn with_source_parser(mut self, parser: impl SourceParser + 'static) -> Self {
		self.scanner = self.scanner.with_source_parser(parser);
		self
	}

	#[must_use]
	pub fn with_renderer(mut self, renderer: impl CommentRenderer + 'static) -> Self {
		self.scanner = self.scanner.with_renderer(renderer);
		self
	}

	pub fn root(&self) -> &Path {
		self.scanner.start_dir()
	}

	/// Resolve `path` against the root. Empty paths resolve to the root.
	pub fn abs_path(&self, path: impl AsRef<Path>) -> PathBuf {
		let path = path.as_ref();
		if is_empty_path(path) {
			self.root().to_path_buf()
		} else if path.is_absolute() {
			clean(path)
		} else {
			clean(&self.root().join(path))
		}
	}

	pub fn modules(&self) -> &[Rc<Module>] {
		self.scanner.modules()
	}

	pub fn packages(&self) -> &[Package] {
		self.scanner.packages()
	}

	pub fn scan_state(&self) -> ScanState {
		self.scanner.state()
	}

	/// Scan `dir` (relative to the root) and add what is found to the result
	/// set. Uses the generator's filter when `filter` is `None`.
	pub fn scan_dir(
		&mut self,
		dir: impl AsRef<Path>,
		mode: ScanMode,
		filter: Option<&dyn ScanFilter>,
	) -> DocgenResult<()> {
		if mode.is_empty() {
			return Ok(());
		}

		let dir = self.abs_path(dir);
		let filter = filter.unwrap_or(self.filter.as_ref());
		self.scanner.scan(&dir, mode, filter)
	}

	/// Render `template` to `writer`, scanning the root first if nothing has
	/// been scanned yet.
	pub fn generate(&mut self, template: impl AsRef<Path>, writer: &mut dyn Write) -> DocgenResult<()> {
		let rendered = self.render(template)?;
		writer
			.write_all(rendered.as_bytes())
			.and_then(|()| writer.flush())
			.map_err(DocgenError::Write)
	}

	/// Render `template` into the file `output`, creating or truncating it
	/// with permission bits `mode` (ignored outside Unix).
	pub fn generate_file(
		&mut self,
		template: impl AsRef<Path>,
		output: impl AsRef<Path>,
		mode: u32,
	) -> DocgenResult<()> {
		let rendered = self.render(template)?;
		let output = self.abs_path(output);
		let mut options = std::fs::OpenOptions::new();
		options.write(true).create(true).truncate(true);
		#[cfg(unix)]
		{
			use std::os::unix::fs::OpenOptionsExt;
			options.mode(mode);
		}
		#[cfg(not(unix))]
		let _ = mode;

		let mut file = options.open(&output).map_err(|e| DocgenError::Output {
			path: output.clone(),
			source: e,
		})?;

		file.write_all(rendered.as_bytes())
			.map_err(|e| DocgenError::Output {
				path: output.clone(),
				source: e,
			})?;

		tracing::info!(output = %output.display(), bytes = rendered.len(), "generated file");
		Ok(())
	}

	/// Render `template` to a string, scanning the root first if nothing has
	/// been scanned yet.
	pub fn render(&mut self, template: impl AsRef<Path>) -> DocgenResult<String> {
		if self.scanner.state() == ScanState::Unscanned {
			let root = self.root().to_path_buf();
			self.scanner.scan(&root, self.mode, self.filter.as_ref())?;
		}

		let path = self.abs_path(template);
		self.load_template(&path)?;
		let source = &self.templates[&path];
		render_template(&path.display().to_string(), source, &self.context())
	}

	fn load_template(&mut self, path: &Path) -> DocgenResult<()> {
		if !self.templates.contains_key(path) {
			let source = std::fs::read_to_string(path).map_err(|e| DocgenError::io(path, e))?;
			tracing::debug!(template = %path.display(), "loaded template");
			self.templates.insert(path.to_path_buf(), source);
		}

		Ok(())
	}

	/// The read-only view handed to templates.
	pub fn context(&self) -> TemplateContext<'_> {
		TemplateContext {
			modules: self.modules().iter().map(AsRef::as_ref).collect(),
			packages: self.packages().iter().map(PackageView::from).collect(),
		}
	}
}

/// Template context: `modules` and `packages` in discovery order.
#[derive(Debug, Serialize)]
pub struct TemplateContext<'a> {
	pub modules: Vec<&'a Module>,
	pub packages: Vec<PackageView<'a>>,
}

/// A package as seen by templates, with its derived fields precomputed.
#[derive(Debug, Serialize)]
pub struct PackageView<'a> {
	pub name: &'a str,
	pub path: &'a str,
	pub import_path: String,
	pub synopsis: String,
	pub module: Option<&'a Module>,
	pub sections: &'a [Section],
}

impl<'a> From<&'a Package> for PackageView<'a> {
	fn from(package: &'a Package) -> Self {
		Self {
			name: &package.name,
			path: &package.path,
			import_path: package.import_path(),
			synopsis: package.synopsis(),
			module: package.module.as_deref(),
			sections: &package.sections,
		}
	}
}

/// Render a template source with `context`.
pub fn render_template(name: &str, source: &str, context: &TemplateContext<'_>) -> DocgenResult<String> {
	let mut env = minijinja::Environment::new();
	env.set_keep_trailing_newline(true);
	env.add_template(name, source)
		.map_err(|e| DocgenError::TemplateRender(e.to_string()))?;

	let template = env
		.get_template(name)
		.map_err(|e| DocgenError::TemplateRender(e.to_string()))?;

	template
		.render(minijinja::Value::from_serialize(context))
		.map_err(|e| DocgenError::TemplateRender(e.to_string()))
}

fn is_empty_path(path: &Path) -> bool {
	matches!(path.to_str(), Some("" | "." | "./"))
}

fn current_dir() -> PathBuf {
	std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Lexically remove `.` and `..` components.
fn clean(path: &Path) -> PathBuf {
	use std::path::Component;

	let mut cleaned = PathBuf::new();
	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				if !cleaned.pop() {
					cleaned.push(component);
				}
			}
			other => cleaned.push(other),
		}
	}
	cleaned
}
