mod common;

use docgen_core::AnyEmptyResult;

#[test]
fn generate_prints_to_stdout_without_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("go.mod", common::GO_MOD),
			("foo.go", common::FOO_GO),
			("readme.tmpl.md", common::SYNOPSIS_TEMPLATE),
		],
	)?;

	common::docgen_cmd()
		.arg("generate")
		.arg("--template")
		.arg("readme.tmpl.md")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("example.com/m: Package foo does X.\n");

	Ok(())
}

#[test]
fn generate_uses_config_template_and_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			(
				"docgen.toml",
				"template = \"readme.tmpl.md\"\noutput = \"README.md\"\n",
			),
			("go.mod", common::GO_MOD),
			("foo.go", common::FOO_GO),
			("cmd/tool/main.go", "// Command tool does Y.\npackage main\n"),
			("readme.tmpl.md", common::SYNOPSIS_TEMPLATE),
		],
	)?;

	common::docgen_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("Generated"))
		.stderr(predicates::str::contains("1 module(s), 2 package(s)"));

	let written = std::fs::read_to_string(tmp.path().join("README.md"))?;
	assert_eq!(
		written,
		"example.com/m: Package foo does X.\ncmd/tool: Command tool does Y.\n"
	);

	Ok(())
}

#[test]
fn generate_flags_override_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("docgen.toml", "template = \"missing.md\"\noutput = \"README.md\"\n"),
			("foo.go", common::FOO_GO),
			("other.tmpl.md", "{{ packages | length }} package(s)\n"),
		],
	)?;

	common::docgen_cmd()
		.arg("generate")
		.arg("--template")
		.arg("other.tmpl.md")
		.arg("--output")
		.arg("docs.md")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert_eq!(std::fs::read_to_string(tmp.path().join("docs.md"))?, "1 package(s)\n");
	assert!(!tmp.path().join("README.md").exists());

	Ok(())
}

#[test]
fn generate_without_template_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::docgen_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no template given"));

	Ok(())
}

#[test]
fn generate_reports_every_failing_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			("a/go.mod", "go 1.21\n"),
			("b/broken.go", "func main() {}\n"),
			("c/c.go", "// Package c is fine.\npackage c\n"),
			("readme.tmpl.md", common::SYNOPSIS_TEMPLATE),
		],
	)?;

	common::docgen_cmd()
		.arg("generate")
		.arg("--template")
		.arg("readme.tmpl.md")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("2 directories failed to scan"))
		.stderr(predicates::str::contains("malformed manifest"))
		.stderr(predicates::str::contains("failed to parse sources"));

	Ok(())
}

#[test]
fn generate_reports_template_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("broken.tmpl.md", "{% for %}")])?;

	common::docgen_cmd()
		.arg("generate")
		.arg("--template")
		.arg("broken.tmpl.md")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("template rendering failed"));

	Ok(())
}
