use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use logos::Logos;

use crate::DocgenError;
use crate::DocgenResult;

/// The raw documentation of one package found in a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDoc {
	/// Name from the package clause.
	pub name: String,
	/// Package comment with comment markers removed. Empty when the package
	/// is undocumented.
	pub doc: String,
}

/// Discovers the packages declared by source files directly inside a
/// directory.
pub trait SourceParser {
	/// Return one [`PackageDoc`] per distinct package, ordered by name. A
	/// directory without sources yields an empty list.
	fn parse_dir(&self, dir: &Path) -> DocgenResult<Vec<PackageDoc>>;
}

/// Reads the package clause and package comment of `*.go` files.
///
/// Only the header of each file is lexed: everything up to and including
/// the package name. Test files (`*_test.go`) are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoSourceParser;

impl SourceParser for GoSourceParser {
	fn parse_dir(&self, dir: &Path) -> DocgenResult<Vec<PackageDoc>> {
		let mut packages: BTreeMap<String, Vec<String>> = BTreeMap::new();

		for file in source_files(dir)? {
			let content =
				std::fs::read_to_string(&file).map_err(|e| DocgenError::io(file.as_path(), e))?;
			let header = parse_header(&content).map_err(|reason| DocgenError::ParseFailure {
				path: file.clone(),
				reason,
			})?;

			let docs = packages.entry(header.name).or_default();
			if !header.doc.is_empty() {
				docs.push(header.doc);
			}
		}

		Ok(packages
			.into_iter()
			.map(|(name, docs)| PackageDoc {
				name,
				doc: docs.join("\n"),
			})
			.collect())
	}
}

fn source_files(dir: &Path) -> DocgenResult<Vec<PathBuf>> {
	let entries = std::fs::read_dir(dir).map_err(|e| DocgenError::io(dir, e))?;
	let mut files = Vec::new();

	for entry in entries {
		let entry = entry.map_err(|e| DocgenError::io(dir, e))?;
		let path = entry.path();
		let is_file = entry.file_type().is_ok_and(|t| t.is_file());
		let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
			continue;
		};

		if is_file && name.ends_with(".go") && !name.ends_with("_test.go") {
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r\u{feff}]+")]
enum HeaderToken {
	#[token("\n")]
	Newline,
	#[regex(r"//[^\n]*", allow_greedy = true)]
	LineComment,
	#[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
	BlockComment,
	#[token("package")]
	Package,
	#[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
	Ident,
}

/// Package clause and package comment of one source file.
#[derive(Debug, PartialEq, Eq)]
struct FileHeader {
	name: String,
	doc: String,
}

/// Lex `content` up to its package clause.
///
/// The package comment is the comment group ending on the line right before
/// (or on the same line as) the `package` keyword. A blank line breaks a
/// comment group.
fn parse_header(content: &str) -> Result<FileHeader, String> {
	let mut lexer = HeaderToken::lexer(content);
	let mut group: Vec<&str> = Vec::new();
	let mut newlines_since_comment = 0usize;

	while let Some(token) = lexer.next() {
		let Ok(token) = token else {
			return Err(format!("unexpected input `{}` before package clause", lexer.slice()));
		};

		match token {
			HeaderToken::Newline => newlines_since_comment += 1,
			HeaderToken::LineComment | HeaderToken::BlockComment => {
				if newlines_since_comment > 1 {
					group.clear();
				}
				group.push(lexer.slice());
				newlines_since_comment = 0;
			}
			HeaderToken::Package => {
				if newlines_since_comment > 1 {
					group.clear();
				}
				let name = loop {
					match lexer.next() {
						Some(Ok(HeaderToken::Ident)) => break lexer.slice().to_string(),
						Some(Ok(HeaderToken::Newline | HeaderToken::BlockComment)) => {}
						_ => return Err("expected package name".to_string()),
					}
				};

				return Ok(FileHeader {
					name,
					doc: comment_text(&group),
				});
			}
			HeaderToken::Ident => {
				return Err(format!("expected `package`, found `{}`", lexer.slice()));
			}
		}
	}

	Err("missing package clause".to_string())
}

/// Strip comment markers from a comment group.
///
/// Removes `//`, `/*` and `*/`, the first space of a line comment, and
/// tool directives such as `//go:build`. Trailing whitespace is trimmed,
/// leading and trailing blank lines are dropped and runs of blank lines
/// collapse into one. A non-empty result ends with a newline.
pub(crate) fn comment_text(group: &[&str]) -> String {
	let mut lines: Vec<&str> = Vec::new();

	for comment in group {
		if let Some(line) = comment.strip_prefix("//") {
			if is_directive(line) {
				continue;
			}
			lines.push(line.strip_prefix(' ').unwrap_or(line));
		} else if let Some(body) = comment.strip_prefix("/*") {
			let body = body.strip_suffix("*/").unwrap_or(body);
			lines.extend(body.split('\n'));
		}
	}

	let mut text = String::new();
	let mut pending_blank = false;
	for line in lines.iter().map(|line| line.trim_end()) {
		if line.is_empty() {
			pending_blank = !text.is_empty();
			continue;
		}
		if pending_blank {
			text.push('\n');
			pending_blank = false;
		}
		text.push_str(line);
		text.push('\n');
	}

	text
}

fn is_directive(line: &str) -> bool {
	if line.starts_with("line ") || line.starts_with("extern ") || line.starts_with("export ") {
		return true;
	}

	// `//tool:directive`, e.g. `//go:build linux`.
	let Some((tool, rest)) = line.split_once(':') else {
		return false;
	};
	let is_lower_alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
	!tool.is_empty() && tool.chars().all(is_lower_alnum) && rest.starts_with(is_lower_alnum)
}
