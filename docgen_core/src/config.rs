use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DocgenError;
use crate::DocgenResult;
use crate::ScanMode;
use crate::filter::ExcludeFilter;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["docgen.toml", ".docgen.toml", ".config/docgen.toml"];

/// Configuration loaded from a `docgen.toml` file.
///
/// ```toml
/// template = "README.tmpl.md"
/// output = "README.md"
///
/// [scan]
/// module = true
/// packages = true
/// deep = true
/// exclude = ["testdata", "tools/**"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct DocgenConfig {
	/// Template file, relative to the project root.
	#[serde(default)]
	pub template: Option<PathBuf>,
	/// Output file, relative to the project root. Standard output when absent.
	#[serde(default)]
	pub output: Option<PathBuf>,
	/// What to scan for.
	#[serde(default)]
	pub scan: ScanConfig,
}

/// The `[scan]` section.
#[derive(Debug, Clone, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ScanConfig {
	/// Detect module manifests.
	#[serde(default = "enabled")]
	pub module: bool,
	/// Extract package documentation.
	#[serde(default = "enabled")]
	pub packages: bool,
	/// Recurse into subdirectories.
	#[serde(default = "enabled")]
	pub deep: bool,
	/// Gitignore-style patterns for subdirectories to skip, on top of hidden
	/// directories and `internal`.
	#[serde(default)]
	pub exclude: Vec<String>,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			module: true,
			packages: true,
			deep: true,
			exclude: Vec::new(),
		}
	}
}

fn enabled() -> bool {
	true
}

impl ScanConfig {
	pub fn mode(&self) -> ScanMode {
		let mut mode = ScanMode::empty();
		mode.set(ScanMode::MODULE, self.module);
		mode.set(ScanMode::PACKAGES, self.packages);
		mode.set(ScanMode::DEEP, self.deep);
		mode
	}

	/// Build the subdirectory filter for a project rooted at `root`.
	pub fn filter(&self, root: &Path) -> DocgenResult<ExcludeFilter> {
		ExcludeFilter::new(root, &self.exclude)
	}
}

impl DocgenConfig {
	/// Find the config file for `root`, if any.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from `root`. Returns `Ok(None)` when no config file
	/// exists.
	pub fn load(root: &Path) -> DocgenResult<Option<Self>> {
		let Some(path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&path).map_err(|e| DocgenError::io(path.as_path(), e))?;
		let config: Self = toml::from_str(&content)
			.map_err(|e| DocgenError::ConfigParse(format!("{}: {e}", path.display())))?;

		tracing::debug!(path = %path.display(), "loaded config");
		Ok(Some(config))
	}
}
