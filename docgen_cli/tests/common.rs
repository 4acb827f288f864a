#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

pub const GO_MOD: &str = "module example.com/m v1.0.0\n\nrequire example.com/dep v0.1.0\n";
pub const FOO_GO: &str = "// Package foo does X.\npackage foo\n";
pub const SYNOPSIS_TEMPLATE: &str =
	"{% for package in packages %}{{ package.import_path }}: {{ package.synopsis }}\n{% endfor %}";

pub fn docgen_cmd() -> Command {
	let mut cmd = Command::cargo_bin("docgen").unwrap_or_else(|e| panic!("cargo_bin: {e}"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("DOCGEN_LOG");
	cmd
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) -> std::io::Result<()> {
	for (path, content) in files {
		let path = root.join(path);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)?;
	}

	Ok(())
}
