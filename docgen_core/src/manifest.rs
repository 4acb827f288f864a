use std::io::ErrorKind;
use std::path::Path;

use logos::Logos;

use crate::DocgenError;
use crate::DocgenResult;
use crate::Module;
use crate::ModuleVersion;

/// Conventional manifest file name read by [`GoModParser`].
pub const GO_MOD_FILE: &str = "go.mod";

/// Parses a module manifest into a [`Module`].
pub trait ManifestParser {
	/// File name of the manifest looked up in every scanned directory.
	fn file_name(&self) -> &str;

	/// Parse `content` read from `path`.
	fn parse(&self, path: &Path, content: &str) -> DocgenResult<Module>;
}

/// Look for a manifest inside `dir` and parse it.
///
/// A missing manifest is not an error and yields `Ok(None)`.
pub fn read_manifest(dir: &Path, parser: &dyn ManifestParser) -> DocgenResult<Option<Module>> {
	let path = dir.join(parser.file_name());
	let content = match std::fs::read_to_string(&path) {
		Ok(content) => content,
		Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(DocgenError::io(path, e)),
	};

	parser.parse(&path, &content).map(Some)
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
enum ModToken {
	#[token("\n")]
	Newline,
	#[regex(r"//[^\n]*", allow_greedy = true)]
	Comment,
	#[token("(")]
	OpenParen,
	#[token(")")]
	CloseParen,
	#[token("=>")]
	Arrow,
	#[regex(r#""([^"\\\n]|\\.)*""#, |lex| unquote(lex.slice()))]
	#[regex(r"`[^`]*`", |lex| lex.slice()[1..lex.slice().len() - 1].to_string())]
	Quoted(String),
	#[regex(r#"/?[^ \t\r\n()"`/]+(/[^ \t\r\n()"`/]+)*"#, |lex| lex.slice().to_string())]
	Word(String),
}

fn unquote(slice: &str) -> String {
	let inner = &slice[1..slice.len() - 1];
	if inner.contains('\\') {
		inner.replace("\\\"", "\"").replace("\\\\", "\\")
	} else {
		inner.to_string()
	}
}

/// One manifest statement: a line of words with the line it started on.
struct Statement {
	line: usize,
	words: Vec<String>,
}

/// Lax `go.mod` parser.
///
/// Understands `module` and `require` directives (single line or
/// parenthesised blocks) and skips every other directive. The `module`
/// directive may carry an optional version after the module path.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoModParser;

impl ManifestParser for GoModParser {
	fn file_name(&self) -> &str {
		GO_MOD_FILE
	}

	fn parse(&self, path: &Path, content: &str) -> DocgenResult<Module> {
		let malformed = |line: usize, reason: String| DocgenError::MalformedManifest {
			path: path.to_path_buf(),
			line,
			reason,
		};

		let mut identity: Option<ModuleVersion> = None;
		let mut deps = Vec::new();

		let statements =
			group_statements(content).map_err(|(line, reason)| malformed(line, reason))?;
		for (verb, statement) in statements {
			match verb.as_str() {
				"module" => {
					let (module_path, version) = match statement.words.as_slice() {
						[module_path] => (module_path.clone(), String::new()),
						[module_path, version] => (module_path.clone(), version.clone()),
						_ => {
							return Err(malformed(
								statement.line,
								"usage: module module/path [version]".to_string(),
							));
						}
					};
					if identity.is_some() {
						return Err(malformed(statement.line, "repeated module statement".to_string()));
					}
					identity = Some(ModuleVersion::new(module_path, version));
				}
				"require" => {
					let [dep_path, version] = statement.words.as_slice() else {
						return Err(malformed(
							statement.line,
							"usage: require module/path version".to_string(),
						));
					};
					deps.push(ModuleVersion::new(dep_path, version));
				}
				_ => {}
			}
		}

		let identity = identity.ok_or_else(|| malformed(1, "no module declaration".to_string()))?;
		Ok(Module::new(identity, deps, path.to_path_buf()))
	}
}

/// Split manifest content into `(verb, statement)` pairs. Statements inside a
/// parenthesised block inherit the verb that opened it.
fn group_statements(content: &str) -> Result<Vec<(String, Statement)>, (usize, String)> {
	let mut statements = Vec::new();
	let mut block_verb: Option<(String, usize)> = None;
	let mut current: Vec<String> = Vec::new();
	let mut current_line = 1;
	let mut line = 1;

	let mut lexer = ModToken::lexer(content);
	while let Some(token) = lexer.next() {
		let Ok(token) = token else {
			return Err((line, format!("unexpected input `{}`", lexer.slice())));
		};

		match token {
			ModToken::Newline => {
				flush_statement(&mut statements, &mut current, block_verb.as_ref(), current_line);
				line += 1;
				current_line = line;
			}
			ModToken::OpenParen => {
				if block_verb.is_some() || current.len() != 1 {
					return Err((line, "unexpected `(`".to_string()));
				}
				block_verb = current.pop().map(|verb| (verb, line));
			}
			ModToken::CloseParen => {
				if block_verb.is_none() {
					return Err((line, "unexpected `)`".to_string()));
				}
				flush_statement(&mut statements, &mut current, block_verb.as_ref(), current_line);
				block_verb = None;
			}
			ModToken::Comment => {}
			ModToken::Arrow => current.push("=>".to_string()),
			ModToken::Quoted(word) | ModToken::Word(word) => {
				if current.is_empty() {
					current_line = line;
				}
				current.push(word);
			}
		}
	}

	if let Some((verb, opened)) = block_verb {
		return Err((opened, format!("unterminated `{verb} (` block")));
	}
	flush_statement(&mut statements, &mut current, None, current_line);

	Ok(statements)
}

fn flush_statement(
	statements: &mut Vec<(String, Statement)>,
	current: &mut Vec<String>,
	block_verb: Option<&(String, usize)>,
	line: usize,
) {
	if current.is_empty() {
		return;
	}

	let mut words = std::mem::take(current);
	let verb = match block_verb {
		Some((verb, _)) => verb.clone(),
		None => words.remove(0),
	};
	statements.push((verb, Statement { line, words }));
}
