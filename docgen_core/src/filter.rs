use std::fs::FileType;
use std::path::Path;

use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::DocgenError;
use crate::DocgenResult;

/// Decides whether a subdirectory takes part in a deep scan.
///
/// Filters are only consulted for directory entries, never for files.
pub trait ScanFilter {
	fn filter_scan(&self, path: &Path, name: &str, file_type: &FileType) -> bool;
}

impl<F> ScanFilter for F
where
	F: Fn(&Path, &str, &FileType) -> bool,
{
	fn filter_scan(&self, path: &Path, name: &str, file_type: &FileType) -> bool {
		self(path, name, file_type)
	}
}

/// Rejects hidden entries and entries named `internal`.
pub fn default_filter(_path: &Path, name: &str, _file_type: &FileType) -> bool {
	!name.is_empty() && !name.starts_with('.') && name != "internal"
}

/// The [`default_filter`] policy as a unit type.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilter;

impl ScanFilter for DefaultFilter {
	fn filter_scan(&self, path: &Path, name: &str, file_type: &FileType) -> bool {
		default_filter(path, name, file_type)
	}
}

/// The default policy extended with gitignore-style exclude patterns.
///
/// Patterns are matched relative to `root`:
///
/// ```toml
/// [scan]
/// exclude = ["testdata", "tools/**"]
/// ```
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
	matcher: Gitignore,
}

impl ExcludeFilter {
	pub fn new(root: &Path, patterns: &[String]) -> DocgenResult<Self> {
		let mut builder = GitignoreBuilder::new(root);
		for pattern in patterns {
			builder.add_line(None, pattern).map_err(|e| {
				DocgenError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
			})?;
		}
		let matcher = builder
			.build()
			.map_err(|e| DocgenError::ConfigParse(format!("failed to build exclude rules: {e}")))?;

		Ok(Self { matcher })
	}
}

impl ScanFilter for ExcludeFilter {
	fn filter_scan(&self, path: &Path, name: &str, file_type: &FileType) -> bool {
		default_filter(path, name, file_type)
			&& !self.matcher.matched(path, file_type.is_dir()).is_ignore()
	}
}
