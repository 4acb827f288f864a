//! Rebuilds a package's section/block tree from a markup fragment stream.
//!
//! The [`Unmarshaler`] consumes fragments one at a time, as they are pushed
//! by a [`CommentRenderer`](crate::CommentRenderer), and never holds more
//! than the currently open text line. Dispatch is a pure [`transition`]
//! function over a [`State`] and the [`FragmentClass`] of the incoming
//! fragment.

use std::mem;

use crate::Block;
use crate::DocgenResult;
use crate::Package;
use crate::Section;
use crate::render::FragmentSink;
use crate::render::HEADING_CLOSE;
use crate::render::PARAGRAPH_CLOSE;
use crate::render::PARAGRAPH_OPEN;
use crate::render::PREFORMATTED_CLOSE;
use crate::render::PREFORMATTED_OPEN;
use crate::render::SECTION_ID_CLOSE;
use crate::render::SECTION_ID_OPEN;

/// Where the unmarshaler is within the fragment stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
	/// Between blocks.
	#[default]
	AwaitingSectionId,
	/// Inside `<h3 id="`, reading the section id.
	InSectionId,
	/// Reading heading text up to `</h3>`.
	InHeading,
	/// Reading paragraph text up to `</p>`.
	InParagraph,
	/// Reading preformatted text up to `</pre>`.
	InPreformatted,
}

impl State {
	/// Whether a block, heading or section id is still open.
	pub fn is_open(self) -> bool {
		self != Self::AwaitingSectionId
	}
}

/// Classification of a single fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentClass {
	SectionIdOpen,
	SectionIdClose,
	HeadingClose,
	ParagraphOpen,
	ParagraphClose,
	PreformattedOpen,
	PreformattedClose,
	Text,
}

impl FragmentClass {
	/// Classify by exact string match against the control vocabulary.
	pub fn of(fragment: &str) -> Self {
		match fragment {
			SECTION_ID_OPEN => Self::SectionIdOpen,
			SECTION_ID_CLOSE => Self::SectionIdClose,
			HEADING_CLOSE => Self::HeadingClose,
			PARAGRAPH_OPEN => Self::ParagraphOpen,
			PARAGRAPH_CLOSE => Self::ParagraphClose,
			PREFORMATTED_OPEN => Self::PreformattedOpen,
			PREFORMATTED_CLOSE => Self::PreformattedClose,
			_ => Self::Text,
		}
	}
}

/// Side effect performed on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	/// Nothing to do.
	Ignore,
	/// Start collecting a section id.
	BeginSectionId,
	/// The fragment is (part of) the section id.
	SectionIdText,
	/// The section id is complete; the heading follows.
	EndSectionId,
	/// Store the line buffer as the current section's heading.
	SetHeading,
	/// Discard the line buffer and start a new one.
	OpenBuffer,
	/// Decode the fragment and append it to the line buffer.
	Accumulate,
	/// Append the line buffer as a paragraph block.
	FlushParagraph,
	/// Append the line buffer as a preformatted block.
	FlushPreformatted,
}

/// The transition table.
///
/// Control fragments that open or close paragraph, preformatted and section
/// id markup act in every state. The id delimiter and the heading close
/// marker are only control fragments inside a section id or heading;
/// elsewhere they are ordinary text.
pub fn transition(state: State, class: FragmentClass) -> (State, Action) {
	use FragmentClass as F;

	match (state, class) {
		(_, F::SectionIdOpen) => (State::InSectionId, Action::BeginSectionId),
		(_, F::ParagraphOpen) => (State::InParagraph, Action::OpenBuffer),
		(_, F::ParagraphClose) => (State::AwaitingSectionId, Action::FlushParagraph),
		(_, F::PreformattedOpen) => (State::InPreformatted, Action::OpenBuffer),
		(_, F::PreformattedClose) => (State::AwaitingSectionId, Action::FlushPreformatted),
		(State::InSectionId, F::SectionIdClose) => (State::InHeading, Action::EndSectionId),
		(State::InSectionId, _) => (State::InSectionId, Action::SectionIdText),
		(State::InHeading, F::HeadingClose) => (State::AwaitingSectionId, Action::SetHeading),
		(State::InHeading | State::InParagraph | State::InPreformatted, _) => {
			(state, Action::Accumulate)
		}
		(State::AwaitingSectionId, _) => (State::AwaitingSectionId, Action::Ignore),
	}
}

/// How a fragment stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
	/// Every opened element was closed; the pending section was kept.
	Complete,
	/// The stream stopped while in the given state. The pending section and
	/// any buffered text were dropped.
	Truncated(State),
}

/// Streaming builder of a [`Package`]'s sections.
///
/// Call [`Unmarshaler::reset`] before each package, push fragments with
/// [`Unmarshaler::feed`] (or through [`FragmentSink`]), then collect the
/// result with [`Unmarshaler::finish`]. One unmarshaler serves one stream
/// at a time.
#[derive(Debug, Default)]
pub struct Unmarshaler {
	package: Option<Package>,
	/// The section currently being filled. Starts as an empty placeholder.
	current: Section,
	/// Whether the current section was started from a section id.
	current_is_open: bool,
	state: State,
	line: String,
}

impl Unmarshaler {
	pub fn new() -> Self {
		Self::default()
	}

	/// Bind to `package`, discarding all previous state.
	pub fn reset(&mut self, package: Package) -> &mut Self {
		self.package = Some(package);
		self.current = Section::default();
		self.current_is_open = false;
		self.state = State::AwaitingSectionId;
		self.line.clear();
		self
	}

	pub fn state(&self) -> State {
		self.state
	}

	/// The package being built, if bound.
	pub fn package(&self) -> Option<&Package> {
		self.package.as_ref()
	}

	/// Consume one fragment.
	pub fn feed(&mut self, fragment: &str) {
		let class = FragmentClass::of(fragment);
		let (next, action) = transition(self.state, class);
		tracing::trace!(from = ?self.state, to = ?next, ?action, fragment, "fragment");

		match action {
			Action::Ignore => {}
			Action::BeginSectionId => {
				self.start_section();
				self.line.clear();
			}
			Action::SectionIdText => self.current.id.push_str(fragment),
			Action::EndSectionId | Action::OpenBuffer => self.line.clear(),
			Action::SetHeading => self.current.heading = mem::take(&mut self.line),
			Action::Accumulate => {
				self.line
					.push_str(&html_escape::decode_html_entities(fragment));
			}
			Action::FlushParagraph => {
				let text = mem::take(&mut self.line);
				self.current.blocks.push(Block::Paragraph(text));
			}
			Action::FlushPreformatted => {
				let text = mem::take(&mut self.line);
				self.current.blocks.push(Block::Preformatted(text));
			}
		}

		self.state = next;
	}

	/// End the stream and hand back the finished package.
	///
	/// The pending section is appended when the stream ended cleanly. A
	/// stream ending inside a section id, heading or block drops the pending
	/// section. Returns `None` when [`Unmarshaler::reset`] was never called.
	pub fn finish(&mut self) -> Option<(Package, StreamEnd)> {
		let mut package = self.package.take()?;
		let current = mem::take(&mut self.current);
		let end = if self.state.is_open() {
			StreamEnd::Truncated(self.state)
		} else {
			if self.current_is_open || !current.is_placeholder() {
				package.sections.push(current);
			}
			StreamEnd::Complete
		};

		self.current_is_open = false;
		self.state = State::AwaitingSectionId;
		self.line.clear();

		Some((package, end))
	}

	/// Append the pending section (unless it is the untouched placeholder)
	/// and start a fresh one.
	fn start_section(&mut self) {
		let previous = mem::take(&mut self.current);
		if self.current_is_open || !previous.is_placeholder() {
			if let Some(package) = self.package.as_mut() {
				package.sections.push(previous);
			}
		}
		self.current_is_open = true;
	}
}

impl FragmentSink for Unmarshaler {
	fn write_fragment(&mut self, fragment: &str) -> DocgenResult<usize> {
		self.feed(fragment);
		Ok(fragment.len())
	}
}
