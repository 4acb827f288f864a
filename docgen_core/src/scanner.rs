use std::collections::HashMap;
use std::fs::FileType;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use crate::DocgenError;
use crate::DocgenResult;
use crate::Module;
use crate::Package;
use crate::ScanErrors;
use crate::filter::DefaultFilter;
use crate::filter::ScanFilter;
use crate::import_path;
use crate::manifest::GoModParser;
use crate::manifest::ManifestParser;
use crate::manifest::read_manifest;
use crate::render::CommentRenderer;
use crate::render::HtmlCommentRenderer;
use crate::source::GoSourceParser;
use crate::source::SourceParser;
use crate::unmarshal::StreamEnd;
use crate::unmarshal::Unmarshaler;

bitflags::bitflags! {
	/// What a scan looks for in each directory.
	///
	/// The empty set scans nothing.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct ScanMode: u8 {
		/// Detect a module manifest.
		const MODULE = 1;
		/// Extract documented packages.
		const PACKAGES = 1 << 1;
		/// Recurse into subdirectories accepted by the filter.
		const DEEP = 1 << 2;

		const ALL = Self::MODULE.bits() | Self::PACKAGES.bits();
		const ALL_DEEP = Self::ALL.bits() | Self::DEEP.bits();
		const PACKAGES_DEEP = Self::PACKAGES.bits() | Self::DEEP.bits();
	}
}

/// Lifecycle of a [`Scanner`]'s result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanState {
	/// No scan has run yet.
	#[default]
	Unscanned,
	/// A scan is in progress.
	Scanning,
	/// At least one scan has completed, successfully or not.
	Scanned,
}

/// Discovers modules and packages below a start directory.
///
/// Results accumulate across calls to [`Scanner::scan`]; use a new scanner
/// for a clean result set. A scanner is single threaded and must not run two
/// scans at the same time.
pub struct Scanner {
	start_dir: PathBuf,
	state: ScanState,
	modules: Vec<Rc<Module>>,
	packages: Vec<Package>,
	/// Manifest detection results of the running traversal, by directory.
	detected: HashMap<PathBuf, Option<Rc<Module>>>,
	manifest_parser: Box<dyn ManifestParser>,
	source_parser: Box<dyn SourceParser>,
	renderer: Box<dyn CommentRenderer>,
	unmarshaler: Unmarshaler,
}

impl std::fmt::Debug for Scanner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Scanner")
			.field("start_dir", &self.start_dir)
			.field("state", &self.state)
			.field("modules", &self.modules.len())
			.field("packages", &self.packages.len())
			.finish_non_exhaustive()
	}
}

impl Scanner {
	/// Create a scanner for `go.mod` manifests and Go package comments.
	pub fn new(start_dir: impl Into<PathBuf>) -> Self {
		Self {
			start_dir: start_dir.into(),
			state: ScanState::Unscanned,
			modules: Vec::with_capacity(2),
			packages: Vec::with_capacity(6),
			detected: HashMap::new(),
			manifest_parser: Box::new(GoModParser),
			source_parser: Box::new(GoSourceParser),
			renderer: Box::new(HtmlCommentRenderer),
			unmarshaler: Unmarshaler::new(),
		}
	}

	#[must_use]
	pub fn with_manifest_parser(mut self, parser: impl ManifestParser + 'static) -> Self {
		self.manifest_parser = Box::new(parser);
		self
	}

	#[must_use]
	pub fn with_source_parser(mut self, parser: impl SourceParser + 'static) -> Self {
		self.source_parser = Box::new(parser);
		self
	}

	#[must_use]
	pub fn with_renderer(mut self, renderer: impl CommentRenderer + 'static) -> Self {
		self.renderer = Box::new(renderer);
		self
	}

	pub fn start_dir(&self) -> &Path {
		&self.start_dir
	}

	pub fn state(&self) -> ScanState {
		self.state
	}

	pub fn modules(&self) -> &[Rc<Module>] {
		&self.modules
	}

	pub fn packages(&self) -> &[Package] {
		&self.packages
	}

	pub fn into_parts(self) -> (Vec<Rc<Module>>, Vec<Package>) {
		(self.modules, self.packages)
	}

	/// Scan `dir` according to `mode`.
	///
	/// Failures in sibling subdirectories are collected into a single
	/// [`DocgenError::Scan`]; everything discovered before and after a
	/// failure stays in the result set.
	pub fn scan(&mut self, dir: &Path, mode: ScanMode, filter: &dyn ScanFilter) -> DocgenResult<()> {
		if mode.is_empty() {
			return Ok(());
		}

		self.state = ScanState::Scanning;
		self.detected.clear();
		let result = self.scan_dir(dir, mode, filter);
		self.detected.clear();
		self.state = ScanState::Scanned;

		tracing::debug!(
			dir = %dir.display(),
			modules = self.modules.len(),
			packages = self.packages.len(),
			ok = result.is_ok(),
			"scan finished"
		);
		result
	}

	fn scan_dir(&mut self, dir: &Path, mode: ScanMode, filter: &dyn ScanFilter) -> DocgenResult<()> {
		tracing::debug!(dir = %dir.display(), ?mode, "scanning directory");

		let mut module = None;
		if mode.contains(ScanMode::MODULE) {
			module = self.detect_manifest(dir)?;
		}

		if mode.contains(ScanMode::PACKAGES) {
			let path = if module.is_some() {
				String::new()
			} else {
				self.relative_path(dir)
			};
			self.extract_packages(dir, &path, module)?;
		}

		if mode.contains(ScanMode::DEEP) {
			let mut errors = ScanErrors::new();
			for (path, name, file_type) in subdirectories(dir)? {
				if !filter.filter_scan(&path, &name, &file_type) {
					tracing::trace!(path = %path.display(), "filtered out");
					continue;
				}

				let result = self.scan_dir(&path, mode, filter);
				if let Err(error) = &result {
					tracing::debug!(path = %path.display(), %error, "subdirectory failed");
				}
				errors.record(&path, result);
			}
			errors.into_result()?;
		}

		Ok(())
	}

	/// Read the manifest in `dir`, registering the module it declares.
	///
	/// Returns `Ok(None)` when `dir` has no manifest. Within one traversal a
	/// directory is only read once; later calls return the earlier module.
	pub fn detect_manifest(&mut self, dir: &Path) -> DocgenResult<Option<Rc<Module>>> {
		if let Some(known) = self.detected.get(dir) {
			return Ok(known.clone());
		}

		let module = read_manifest(dir, self.manifest_parser.as_ref())?.map(Rc::new);
		if let Some(module) = &module {
			tracing::debug!(
				module = %module.identity(),
				deps = module.deps.len(),
				file = %module.file_path.display(),
				"found module"
			);
			self.modules.push(Rc::clone(module));
		}
		self.detected.insert(dir.to_path_buf(), module.clone());

		Ok(module)
	}

	/// Extract every package declared directly in `dir`.
	///
	/// Each package's comment is rendered straight into the unmarshaler so
	/// the markup is never materialised. A parse failure aborts the whole
	/// directory.
	pub fn extract_packages(
		&mut self,
		dir: &Path,
		path: &str,
		module: Option<Rc<Module>>,
	) -> DocgenResult<()> {
		let docs = self.source_parser.parse_dir(dir)?;

		for doc in docs {
			// Without an owning module the package name stands in for the
			// import path in diagnostics.
			let identity = match module.as_deref() {
				Some(module) => import_path(path, Some(module)),
				None => doc.name.clone(),
			};
			let package = Package::new(doc.name, path, module.clone());
			self.unmarshaler.reset(package);
			self.renderer.render(&doc.doc, &mut self.unmarshaler)?;

			let Some((package, end)) = self.unmarshaler.finish() else {
				continue;
			};
			if let StreamEnd::Truncated(state) = end {
				tracing::warn!(
					dir = %dir.display(),
					package = %identity,
					?state,
					"documentation stream ended early, dropped the last section"
				);
			}

			tracing::debug!(
				package = %identity,
				path = %package.path,
				sections = package.sections.len(),
				"found package"
			);
			self.packages.push(package);
		}

		Ok(())
	}

	/// `dir` relative to the start directory, `/`-separated. Empty for the
	/// start directory itself and for directories outside of it.
	fn relative_path(&self, dir: &Path) -> String {
		let Ok(relative) = dir.strip_prefix(&self.start_dir) else {
			return String::new();
		};

		relative
			.components()
			.filter_map(|component| match component {
				Component::Normal(part) => Some(part.to_string_lossy()),
				_ => None,
			})
			.collect::<Vec<_>>()
			.join("/")
	}
}

/// List the immediate subdirectories of `dir`, sorted by name.
fn subdirectories(dir: &Path) -> DocgenResult<Vec<(PathBuf, String, FileType)>> {
	let entries = std::fs::read_dir(dir).map_err(|e| DocgenError::io(dir, e))?;
	let mut dirs = Vec::new();

	for entry in entries {
		let entry = entry.map_err(|e| DocgenError::io(dir, e))?;
		let file_type = entry.file_type().map_err(|e| DocgenError::io(entry.path(), e))?;
		if !file_type.is_dir() {
			continue;
		}

		let name = entry.file_name().to_string_lossy().into_owned();
		dirs.push((entry.path(), name, file_type));
	}

	dirs.sort_by(|a, b| a.1.cmp(&b.1));
	Ok(dirs)
}

/// Scan `path` with a fresh [`Scanner`].
///
/// When `filter` is `None` the [`DefaultFilter`] is used. The discovered
/// modules and packages are returned even when the scan reports an error.
pub fn scan_dir(
	path: &Path,
	mode: ScanMode,
	filter: Option<&dyn ScanFilter>,
) -> (Vec<Rc<Module>>, Vec<Package>, DocgenResult<()>) {
	let mut scanner = Scanner::new(path);
	let result = scanner.scan(path, mode, filter.unwrap_or(&DefaultFilter));
	let (modules, packages) = scanner.into_parts();
	(modules, packages, result)
}
