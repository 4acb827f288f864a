use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use serde::Serialize;

/// A module path paired with a version, e.g. `example.com/dep@v0.1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleVersion {
	pub path: String,
	pub version: String,
}

impl ModuleVersion {
	pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			version: version.into(),
		}
	}
}

impl fmt::Display for ModuleVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.version.is_empty() {
			write!(f, "{}", self.path)
		} else {
			write!(f, "{}@{}", self.path, self.version)
		}
	}
}

/// A module discovered from a manifest file.
///
/// Modules are created once per manifest and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
	/// Module path as declared by the manifest.
	pub path: String,
	/// Module version as declared by the manifest, empty when absent.
	pub version: String,
	/// Required modules in declaration order.
	pub deps: Vec<ModuleVersion>,
	/// Location of the manifest the module was read from.
	pub file_path: PathBuf,
}

impl Module {
	pub fn new(identity: ModuleVersion, deps: Vec<ModuleVersion>, file_path: PathBuf) -> Self {
		Self {
			path: identity.path,
			version: identity.version,
			deps,
			file_path,
		}
	}

	pub fn identity(&self) -> ModuleVersion {
		ModuleVersion::new(&self.path, &self.version)
	}
}

/// A documented package found in a single directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
	/// Name used in the package clause.
	pub name: String,
	/// Path relative to the owning module (or to the scan root when there is
	/// no module). Joined with the module path it forms the import path.
	pub path: String,
	/// The module owning this package, if its directory holds a manifest.
	pub module: Option<Rc<Module>>,
	/// Documentation sections in document order.
	pub sections: Vec<Section>,
}

impl Package {
	pub fn new(name: impl Into<String>, path: impl Into<String>, module: Option<Rc<Module>>) -> Self {
		Self {
			name: name.into(),
			path: path.into(),
			module,
			sections: Vec::new(),
		}
	}

	pub fn import_path(&self) -> String {
		import_path(&self.path, self.module.as_deref())
	}

	pub fn section(&self, index: usize) -> Option<&Section> {
		self.sections.get(index)
	}

	/// The first sentence of the package documentation.
	///
	/// Taken from the first block of the first section. Returns an empty
	/// string when there is no documentation or when it starts with a legal
	/// notice.
	pub fn synopsis(&self) -> String {
		self.sections
			.first()
			.and_then(|section| section.blocks.first())
			.map(|block| synopsis(block.text()))
			.unwrap_or_default()
	}
}

/// Join a module path with a package path relative to it.
pub fn import_path(package_path: &str, module: Option<&Module>) -> String {
	let Some(module) = module else {
		return package_path.to_string();
	};

	let package_path = package_path.trim_matches('/');
	if package_path.is_empty() || package_path == "." {
		module.path.clone()
	} else {
		format!("{}/{package_path}", module.path.trim_end_matches('/'))
	}
}

const LEGAL_PREFIXES: [&str; 3] = ["copyright", "all rights", "author"];

/// Extract the first sentence of `text` with whitespace collapsed.
pub fn synopsis(text: &str) -> String {
	let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
	let sentence = &collapsed[..first_sentence_len(&collapsed)];
	let lower = sentence.to_lowercase();
	if LEGAL_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
		return String::new();
	}

	sentence.to_string()
}

/// Length of the first sentence: up to and including the first period that
/// is followed by whitespace and does not terminate a single upper-case
/// initial such as the `B.` in `A B. C`.
fn first_sentence_len(text: &str) -> usize {
	let mut prev2 = ' ';
	let mut prev1 = ' ';
	let mut chars = text.char_indices().peekable();
	while let Some((index, ch)) = chars.next() {
		if ch == '.' {
			let followed_by_space = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
			let is_initial = prev1.is_uppercase() && prev2 == ' ';
			if followed_by_space && !is_initial {
				return index + 1;
			}
		}
		prev2 = prev1;
		prev1 = ch;
	}

	text.len()
}

/// A titled subdivision of package documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Section {
	/// Anchor identifier, empty for the leading untitled section.
	pub id: String,
	pub heading: String,
	pub blocks: Vec<Block>,
}

impl Section {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			heading: String::new(),
			blocks: Vec::new(),
		}
	}

	/// True for a section that has neither an id, a heading nor any blocks.
	pub fn is_placeholder(&self) -> bool {
		self.id.is_empty() && self.heading.is_empty() && self.blocks.is_empty()
	}
}

/// An atomic unit of documentation content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Block {
	/// Prose text.
	Paragraph(String),
	/// Literal text such as code samples.
	Preformatted(String),
}

impl Block {
	pub fn text(&self) -> &str {
		match self {
			Self::Paragraph(text) | Self::Preformatted(text) => text,
		}
	}

	pub fn is_preformatted(&self) -> bool {
		matches!(self, Self::Preformatted(_))
	}
}

impl fmt::Display for Block {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.text())
	}
}
