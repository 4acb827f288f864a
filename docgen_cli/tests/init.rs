mod common;

use docgen_core::AnyEmptyResult;
use docgen_core::DocgenConfig;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::docgen_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created docgen.toml"))
		.stdout(predicates::str::contains("Created template file"));

	let template = std::fs::read_to_string(tmp.path().join("README.tmpl.md"))?;
	assert!(template.contains("package.import_path"));

	let Some(config) = DocgenConfig::load(tmp.path())? else {
		panic!("init should create a config file");
	};
	assert_eq!(config.template.as_deref(), Some(std::path::Path::new("README.tmpl.md")));
	assert_eq!(config.output.as_deref(), Some(std::path::Path::new("README.md")));
	assert!(config.scan.exclude.is_empty());

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(
		tmp.path(),
		&[
			(".docgen.toml", "template = \"custom.md\"\n"),
			("README.tmpl.md", "existing template"),
		],
	)?;

	common::docgen_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert!(!tmp.path().join("docgen.toml").exists());
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("README.tmpl.md"))?,
		"existing template"
	);

	Ok(())
}

#[test]
fn init_then_generate_writes_readme() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_files(tmp.path(), &[("go.mod", common::GO_MOD), ("foo.go", common::FOO_GO)])?;

	common::docgen_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	common::docgen_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let readme = std::fs::read_to_string(tmp.path().join("README.md"))?;
	assert!(readme.starts_with("# example.com/m\n"));
	assert!(readme.contains("## example.com/m\n\nPackage foo does X.\n"));

	Ok(())
}
