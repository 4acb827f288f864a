use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate readme files from module and package documentation.",
	long_about = "docgen scans a project for module manifests (go.mod) and package comments and \
	              renders them through a template, so readme files stay in sync with the \
	              documentation in the source.\n\nQuick start:\n  docgen init      Create \
	              docgen.toml and a sample template\n  docgen list      Show discovered modules \
	              and packages\n  docgen generate  Render the template"
)]
pub struct DocgenCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output. Sets the log level to `debug` unless
	/// `DOCGEN_LOG` is set.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize docgen in a project.
	///
	/// Creates a `docgen.toml` config and a `README.tmpl.md` template in the
	/// project root. Existing files are left untouched.
	Init,
	/// Render a template with the discovered modules and packages.
	///
	/// Scans the project root (recursively, skipping hidden directories,
	/// `internal` and configured excludes) and renders the template. Falls
	/// back to the `template` and `output` values of `docgen.toml`; without
	/// an output the result is written to standard output.
	Generate {
		/// Template file, relative to the project root.
		#[arg(long, short)]
		template: Option<PathBuf>,

		/// Output file, relative to the project root.
		#[arg(long, short)]
		output: Option<PathBuf>,
	},
	/// List the discovered modules and packages.
	List {
		/// Output format. Use `text` for human-readable output or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
