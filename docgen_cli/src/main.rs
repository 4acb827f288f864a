use std::io::Write;
use std::path::Path;
use std::process;

use clap::Parser;
use docgen_cli::Commands;
use docgen_cli::DocgenCli;
use docgen_cli::OutputFormat;
use docgen_core::CONFIG_FILE_CANDIDATES;
use docgen_core::DEFAULT_OUTPUT_MODE;
use docgen_core::DocgenConfig;
use docgen_core::DocgenError;
use docgen_core::Generator;
use docgen_core::Module;
use docgen_core::Package;
use owo_colors::OwoColorize;
use owo_colors::Style;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "DOCGEN_LOG";

const SAMPLE_TEMPLATE_FILE: &str = "README.tmpl.md";

const SAMPLE_TEMPLATE: &str = r#"{% for module in modules %}# {{ module.path }}
{% endfor %}{% for package in packages %}
## {{ package.import_path }}

{{ package.synopsis }}
{% for section in package.sections %}{% if section.heading %}
### {{ section.heading }}
{% endif %}{% for block in section.blocks %}
{% if block.kind == "preformatted" %}```
{{ block.text }}```
{% else %}{{ block.text }}{% endif %}{% endfor %}{% endfor %}{% endfor %}
"#;

const SAMPLE_CONFIG: &str = "# docgen configuration\n\n# Template rendered by `docgen generate`, \
                             relative to this directory.\ntemplate = \"README.tmpl.md\"\n# Output \
                             file. Omit to print to standard output.\noutput = \"README.md\"\n\n[scan]\n# \
                             Detect go.mod manifests.\nmodule = true\n# Extract package \
                             comments.\npackages = true\n# Recurse into subdirectories.\ndeep = \
                             true\n# Gitignore-style patterns of directories to skip. Hidden \
                             directories and `internal` are always skipped.\nexclude = []\n";

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Terminal styling, disabled by `--no-color` or `NO_COLOR`.
#[derive(Debug, Clone, Copy)]
struct Palette {
	color: bool,
}

impl Palette {
	fn new(args: &DocgenCli) -> Self {
		Self {
			color: !args.no_color && std::env::var_os("NO_COLOR").is_none(),
		}
	}

	fn paint(self, text: &str, style: Style) -> String {
		if self.color {
			text.style(style).to_string()
		} else {
			text.to_string()
		}
	}

	fn error(self, text: &str) -> String {
		self.paint(text, Style::new().red().bold())
	}

	fn success(self, text: &str) -> String {
		self.paint(text, Style::new().green())
	}

	fn heading(self, text: &str) -> String {
		self.paint(text, Style::new().bold())
	}

	fn muted(self, text: &str) -> String {
		self.paint(text, Style::new().dimmed())
	}
}

fn main() {
	let args = DocgenCli::parse();
	let palette = Palette::new(&args);
	init_tracing(args.verbose, palette.color);

	let Some(command) = &args.command else {
		eprintln!("No subcommand specified. Run `docgen --help` for usage.");
		process::exit(1);
	};

	let result = match command {
		Commands::Init => run_init(&args),
		Commands::Generate { template, output } => {
			run_generate(&args, palette, template.as_deref(), output.as_deref())
		}
		Commands::List { format } => run_list(&args, palette, *format),
	};

	if let Err(error) = result {
		report(error, palette);
		process::exit(2);
	}
}

/// Print `error` to stderr. Core errors are rendered as miette diagnostics
/// so their codes, help text and related scan failures are shown.
fn report(error: Box<dyn std::error::Error>, palette: Palette) {
	let error = match error.downcast::<DocgenError>() {
		Ok(error) => error,
		Err(other) => {
			eprintln!("{} {other}", palette.error("error:"));
			return;
		}
	};

	let handler = miette::GraphicalReportHandler::new_themed(if palette.color {
		miette::GraphicalTheme::unicode()
	} else {
		miette::GraphicalTheme::unicode_nocolor()
	});
	let mut rendered = String::new();
	if handler.render_report(&mut rendered, error.as_ref()).is_err() {
		rendered = error.to_string();
	}
	eprintln!("{rendered}");
}

/// Log to stderr. `DOCGEN_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, ansi: bool) {
	let level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_env(LOG_ENV)
		.unwrap_or_else(|_| EnvFilter::new(format!("warn,docgen_core={level},docgen={level}")));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(ansi)
		.with_target(false)
		.init();
}

/// The `--path` argument, or the current directory when absent.
fn project_root(args: &DocgenCli) -> &Path {
	args.path.as_deref().unwrap_or(Path::new(""))
}

fn load_config(root: &Path) -> Result<DocgenConfig, Box<dyn std::error::Error>> {
	let config = DocgenConfig::load(root)?;
	if config.is_none() {
		tracing::debug!(root = %root.display(), "no config file found, using defaults");
	}

	Ok(config.unwrap_or_default())
}

fn run_init(args: &DocgenCli) -> CliResult {
	let root = project_root(args);
	let template_path = root.join(SAMPLE_TEMPLATE_FILE);

	if let Some(existing) = DocgenConfig::resolve_path(root) {
		println!("Config file already exists: {}", existing.display());
	} else {
		let config_path = root.join(CONFIG_FILE_CANDIDATES[0]);
		std::fs::write(&config_path, SAMPLE_CONFIG)?;
		println!("Created {}", CONFIG_FILE_CANDIDATES[0]);
	}

	if template_path.exists() {
		println!("Template file already exists: {}", template_path.display());
		return Ok(());
	}

	std::fs::write(&template_path, SAMPLE_TEMPLATE)?;
	println!("Created template file: {}", template_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Edit {SAMPLE_TEMPLATE_FILE} to shape your readme");
	println!("  2. Run `docgen list` to see what will be documented");
	println!("  3. Run `docgen generate` to write README.md");

	Ok(())
}

fn run_generate(
	args: &DocgenCli,
	palette: Palette,
	template: Option<&Path>,
	output: Option<&Path>,
) -> CliResult {
	let root = project_root(args);
	let config = load_config(root)?;

	let template = template
		.or(config.template.as_deref())
		.ok_or("no template given: pass `--template` or set `template` in docgen.toml")?
		.to_path_buf();
	let output = output.or(config.output.as_deref()).map(Path::to_path_buf);

	let mut generator = Generator::from_config(root, &config)?;
	match output {
		Some(output) => {
			generator.generate_file(&template, &output, DEFAULT_OUTPUT_MODE)?;
			eprintln!(
				"{} {} ({} module(s), {} package(s))",
				palette.success("Generated"),
				output.display(),
				generator.modules().len(),
				generator.packages().len()
			);
		}
		None => {
			let stdout = std::io::stdout();
			let mut handle = stdout.lock();
			generator.generate(&template, &mut handle)?;
			handle.flush()?;
		}
	}

	Ok(())
}

fn run_list(args: &DocgenCli, palette: Palette, format: OutputFormat) -> CliResult {
	let root = project_root(args);
	let config = load_config(root)?;
	let mut generator = Generator::from_config(root, &config)?;

	// Partial results are still listed before the scan error is reported.
	let scan_result = generator.scan_dir("", config.scan.mode(), None);

	match format {
		OutputFormat::Json => print_list_json(generator.root(), generator.modules(), generator.packages())?,
		OutputFormat::Text => {
			print_list_text(palette, generator.root(), generator.modules(), generator.packages());
		}
	}

	scan_result?;
	Ok(())
}

fn print_list_text(palette: Palette, root: &Path, modules: &[std::rc::Rc<Module>], packages: &[Package]) {
	if modules.is_empty() && packages.is_empty() {
		println!("No modules or packages found.");
		return;
	}

	if !modules.is_empty() {
		println!("{}", palette.heading("Modules:"));
		for module in modules {
			let rel = make_relative(&module.file_path, root);
			println!(
				"  {} {} ({} dependenc{})",
				module.identity(),
				palette.muted(&rel),
				module.deps.len(),
				if module.deps.len() == 1 { "y" } else { "ies" }
			);
		}
	}

	if !packages.is_empty() {
		if !modules.is_empty() {
			println!();
		}
		println!("{}", palette.heading("Packages:"));
		for package in packages {
			let synopsis = package.synopsis();
			if synopsis.is_empty() {
				println!("  {}", package.import_path());
			} else {
				println!("  {}  {synopsis}", package.import_path());
			}
		}
	}

	println!("\n{} module(s), {} package(s)", modules.len(), packages.len());
}

fn print_list_json(
	root: &Path,
	modules: &[std::rc::Rc<Module>],
	packages: &[Package],
) -> CliResult {
	let modules: Vec<serde_json::Value> = modules
		.iter()
		.map(|module| {
			serde_json::json!({
				"path": module.path,
				"version": module.version,
				"file": make_relative(&module.file_path, root),
				"deps": module.deps,
			})
		})
		.collect();

	let packages: Vec<serde_json::Value> = packages
		.iter()
		.map(|package| {
			serde_json::json!({
				"name": package.name,
				"path": package.path,
				"import_path": package.import_path(),
				"synopsis": package.synopsis(),
				"module": package.module.as_ref().map(|module| module.path.as_str()),
				"sections": package.sections.len(),
			})
		})
		.collect();

	let output = serde_json::json!({
		"root": root.display().to_string(),
		"modules": modules,
		"packages": packages,
	});
	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
