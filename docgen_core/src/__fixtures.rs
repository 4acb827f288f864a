use std::path::Path;
use std::path::PathBuf;

use crate::Block;
use crate::CommentRenderer;
use crate::DocgenResult;
use crate::FragmentSink;
use crate::Unmarshaler;
use crate::render::HEADING_CLOSE;
use crate::render::PARAGRAPH_CLOSE;
use crate::render::PARAGRAPH_OPEN;
use crate::render::PREFORMATTED_CLOSE;
use crate::render::PREFORMATTED_OPEN;
use crate::render::SECTION_ID_CLOSE;
use crate::render::SECTION_ID_OPEN;

pub const SCENARIO_GO_MOD: &str = "module example.com/m v1.0.0\n\nrequire example.com/dep v0.1.0\n";
pub const SCENARIO_FOO_GO: &str = "// Package foo does X.\npackage foo\n";

/// `[id-open, "intro", id-close, para-open, "Package foo does X.", para-close]`
pub fn scenario_stream() -> Vec<&'static str> {
	vec![
		SECTION_ID_OPEN,
		"intro",
		SECTION_ID_CLOSE,
		PARAGRAPH_OPEN,
		"Package foo does X.",
		PARAGRAPH_CLOSE,
	]
}

/// A section with a heading followed by `blocks`.
pub fn section_stream(id: &str, heading: &str, blocks: &[Block]) -> Vec<String> {
	let mut fragments = vec![
		SECTION_ID_OPEN.to_string(),
		id.to_string(),
		SECTION_ID_CLOSE.to_string(),
		heading.to_string(),
		HEADING_CLOSE.to_string(),
	];

	for block in blocks {
		let (open, close) = match block {
			Block::Paragraph(_) => (PARAGRAPH_OPEN, PARAGRAPH_CLOSE),
			Block::Preformatted(_) => (PREFORMATTED_OPEN, PREFORMATTED_CLOSE),
		};
		fragments.push(open.to_string());
		fragments.push(block.text().to_string());
		fragments.push(close.to_string());
	}

	fragments
}

pub fn feed_all<S: AsRef<str>>(unmarshaler: &mut Unmarshaler, fragments: &[S]) {
	for fragment in fragments {
		unmarshaler.feed(fragment.as_ref());
	}
}

/// Ignores the comment text and replays a fixed fragment stream.
#[derive(Debug, Clone)]
pub struct FixedRenderer(pub Vec<&'static str>);

impl CommentRenderer for FixedRenderer {
	fn render(&self, _text: &str, sink: &mut dyn FragmentSink) -> DocgenResult<()> {
		for fragment in &self.0 {
			sink.write_fragment(fragment)?;
		}

		Ok(())
	}
}

/// Write `files` below `root`, creating parent directories as needed.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
	for (path, content) in files {
		let path = root.join(path);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create_dir_all: {e}"));
		}
		std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
	}
}

pub fn create_dirs(root: &Path, dirs: &[&str]) -> Vec<PathBuf> {
	dirs.iter()
		.map(|dir| {
			let path = root.join(dir);
			std::fs::create_dir_all(&path).unwrap_or_else(|e| panic!("create_dir_all: {e}"));
			path
		})
		.collect()
}
