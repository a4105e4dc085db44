#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

pub fn incl_cmd() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_incl"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

pub fn write_file(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

/// A project with one rule, `src/*.txt -> out`, and a shared search root.
pub fn sample_project(root: &Path) -> std::io::Result<()> {
	write_file(
		root,
		"incl.toml",
		"include = [\"./\", \"shared\"]\n\n[[rules]]\nsrc = \"src/*.txt\"\ndest = \"out\"\n",
	)?;
	write_file(
		root,
		"src/main.txt",
		"A\n  #{include \"frag.txt\"}\n#{include \"banner.txt\"}\nB\n",
	)?;
	write_file(root, "src/frag.txt", "1\n2")?;
	write_file(root, "shared/banner.txt", "== banner ==")
}
