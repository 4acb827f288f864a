//! Comment-to-markup rendering.
//!
//! A [`CommentRenderer`] turns package comment text into a linear stream of
//! markup fragments and pushes them, in order, into a [`FragmentSink`]. The
//! markup vocabulary is deliberately small:
//!
//! ```text
//! <h3 id="  {id}  ">  {heading}  </h3>\n
//! <p>\n     {line}...             </p>\n
//! <pre>     {line}...             </pre>\n
//! ```

use crate::DocgenResult;

pub const SECTION_ID_OPEN: &str = "<h3 id=\"";
pub const SECTION_ID_CLOSE: &str = "\">";
pub const HEADING_CLOSE: &str = "</h3>\n";
pub const PARAGRAPH_OPEN: &str = "<p>\n";
pub const PARAGRAPH_CLOSE: &str = "</p>\n";
pub const PREFORMATTED_OPEN: &str = "<pre>";
pub const PREFORMATTED_CLOSE: &str = "</pre>\n";

/// Receives markup fragments in emission order.
pub trait FragmentSink {
	/// Consume one fragment, returning the number of bytes consumed.
	fn write_fragment(&mut self, fragment: &str) -> DocgenResult<usize>;
}

impl FragmentSink for Vec<String> {
	fn write_fragment(&mut self, fragment: &str) -> DocgenResult<usize> {
		self.push(fragment.to_string());
		Ok(fragment.len())
	}
}

/// Renders comment text as markup fragments.
pub trait CommentRenderer {
	fn render(&self, text: &str, sink: &mut dyn FragmentSink) -> DocgenResult<()>;
}

/// Renders plain comment text with the conventions of Go doc comments.
///
/// - Blank lines separate paragraphs.
/// - Indented lines form a preformatted block.
/// - A single line surrounded by blank lines, followed by an unindented
///   paragraph, becomes a heading when it starts with `# ` or looks like a
///   title: an upper-case start, a letter or digit at the end and no
///   sentence punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlCommentRenderer;

impl CommentRenderer for HtmlCommentRenderer {
	fn render(&self, text: &str, sink: &mut dyn FragmentSink) -> DocgenResult<()> {
		for block in blocks(text) {
			match block {
				TextBlock::Heading(heading) => {
					sink.write_fragment(SECTION_ID_OPEN)?;
					sink.write_fragment(&anchor_id(&heading))?;
					sink.write_fragment(SECTION_ID_CLOSE)?;
					sink.write_fragment(&escape(&heading, true))?;
					sink.write_fragment(HEADING_CLOSE)?;
				}
				TextBlock::Paragraph(lines) => {
					sink.write_fragment(PARAGRAPH_OPEN)?;
					for line in lines {
						sink.write_fragment(&escape(line, true))?;
					}
					sink.write_fragment(PARAGRAPH_CLOSE)?;
				}
				TextBlock::Preformatted(lines) => {
					sink.write_fragment(PREFORMATTED_OPEN)?;
					for line in lines {
						sink.write_fragment(&escape(&line, false))?;
					}
					sink.write_fragment(PREFORMATTED_CLOSE)?;
				}
			}
		}

		Ok(())
	}
}

#[derive(Debug, PartialEq, Eq)]
enum TextBlock<'a> {
	Heading(String),
	Paragraph(Vec<&'a str>),
	Preformatted(Vec<String>),
}

fn blocks(text: &str) -> Vec<TextBlock<'_>> {
	let mut lines: Vec<&str> = text.split_inclusive('\n').collect();
	let common = common_indent(&lines);
	for line in &mut lines {
		if !is_blank(line) {
			*line = &line[common..];
		}
	}

	let mut out = Vec::new();
	let mut para: Vec<&str> = Vec::new();
	let mut last_was_blank = false;
	let mut last_was_heading = false;
	let mut i = 0;

	while i < lines.len() {
		let line = lines[i];

		if is_blank(line) {
			close_paragraph(&mut out, &mut para);
			last_was_blank = true;
			i += 1;
			continue;
		}

		if indent_len(line) > 0 {
			close_paragraph(&mut out, &mut para);

			let mut end = i + 1;
			while end < lines.len() && (is_blank(lines[end]) || indent_len(lines[end]) > 0) {
				end += 1;
			}
			while end > i && is_blank(lines[end - 1]) {
				end -= 1;
			}

			out.push(TextBlock::Preformatted(unindent(&lines[i..end])));
			last_was_blank = false;
			last_was_heading = false;
			i = end;
			continue;
		}

		let surrounded = i + 2 < lines.len()
			&& is_blank(lines[i + 1])
			&& !is_blank(lines[i + 2])
			&& indent_len(lines[i + 2]) == 0;
		if last_was_blank && !last_was_heading && surrounded {
			if let Some(heading) = heading(line) {
				close_paragraph(&mut out, &mut para);
				out.push(TextBlock::Heading(heading));
				last_was_heading = true;
				i += 2;
				continue;
			}
		}

		last_was_blank = false;
		last_was_heading = false;
		para.push(line);
		i += 1;
	}
	close_paragraph(&mut out, &mut para);

	out
}

fn close_paragraph<'a>(out: &mut Vec<TextBlock<'a>>, para: &mut Vec<&'a str>) {
	if !para.is_empty() {
		out.push(TextBlock::Paragraph(std::mem::take(para)));
	}
}

fn is_blank(line: &str) -> bool {
	line.trim().is_empty()
}

fn indent_len(line: &str) -> usize {
	line.len() - line.trim_start_matches([' ', '\t']).len()
}

fn common_indent(lines: &[&str]) -> usize {
	let mut non_blank = lines.iter().filter(|line| !is_blank(line));
	let Some(first) = non_blank.next() else {
		return 0;
	};

	let mut prefix = &first[..indent_len(first)];
	for line in non_blank {
		let shared = prefix
			.bytes()
			.zip(line.bytes())
			.take_while(|(a, b)| a == b)
			.count();
		prefix = &prefix[..shared];
	}

	prefix.len()
}

fn unindent(lines: &[&str]) -> Vec<String> {
	let common = common_indent(lines);
	lines
		.iter()
		.map(|line| {
			if is_blank(line) {
				"\n".to_string()
			} else {
				line[common..].to_string()
			}
		})
		.collect()
}

/// Return the heading text when `line` qualifies as a heading.
fn heading(line: &str) -> Option<String> {
	let line = line.trim();
	if let Some(explicit) = line.strip_prefix("# ") {
		let explicit = explicit.trim();
		return (!explicit.is_empty()).then(|| explicit.to_string());
	}

	let first = line.chars().next()?;
	if !first.is_alphabetic() || !first.is_uppercase() {
		return None;
	}
	let last = line.chars().next_back()?;
	if !last.is_alphanumeric() {
		return None;
	}
	if line.contains(|c: char| ";:!?+*/=[]{}_^°&§~%#@<\">\\".contains(c)) {
		return None;
	}

	// An apostrophe is only allowed as a possessive `'s`.
	let mut rest = line;
	while let Some(pos) = rest.find('\'') {
		let after = &rest[pos + 1..];
		if !after.starts_with('s') || after[1..].chars().next().is_some_and(|c| c != ' ') {
			return None;
		}
		rest = &after[1..];
	}

	// A period is only allowed when followed by a non-space, as in `v1.2`.
	let mut rest = line;
	while let Some(pos) = rest.find('.') {
		let after = &rest[pos + 1..];
		if after.is_empty() || after.starts_with(' ') {
			return None;
		}
		rest = after;
	}

	Some(line.to_string())
}

/// Build the anchor id for a heading: `hdr-` followed by the heading with
/// every character that is not a letter or digit replaced by `_`.
pub fn anchor_id(heading: &str) -> String {
	let mut id = String::with_capacity(heading.len() + 4);
	id.push_str("hdr-");
	id.extend(
		heading
			.chars()
			.map(|c| if c.is_alphanumeric() { c } else { '_' }),
	);
	id
}

/// Escape text for markup output. With `nice` set, doubled backticks and
/// doubled single quotes become typographic quotes.
fn escape(text: &str, nice: bool) -> String {
	let text = if nice {
		text.replace("``", "\u{201c}").replace("''", "\u{201d}")
	} else {
		text.to_string()
	};

	html_escape::encode_safe(&text).into_owned()
}
