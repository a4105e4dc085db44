use incl_core::AnyEmptyResult;

mod common;

#[test]
fn run_writes_substituted_outputs() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_project(tmp.path())?;

	let mut cmd = common::incl_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Wrote 2 of 2 file(s)."));

	let content = std::fs::read_to_string(tmp.path().join("out/main.txt"))?;
	assert_eq!(content, "A\n  1\n  2\n== banner ==\nB\n");

	Ok(())
}

#[test]
fn run_reports_unresolved_include_and_still_writes() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(
		tmp.path(),
		"incl.toml",
		"[[rules]]\nsrc = \"src/page.txt\"\ndest = \"out\"\n",
	)?;
	common::write_file(tmp.path(), "src/page.txt", "top\n#{include \"gone.txt\"}\n")?;

	let mut cmd = common::incl_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains(
			"could not resolve include `gone.txt`",
		))
		.stdout(predicates::str::contains("Wrote 1 of 1 file(s)."));

	let content = std::fs::read_to_string(tmp.path().join("out/page.txt"))?;
	assert_eq!(content, "top\n#{include \"gone.txt\"}\n");

	Ok(())
}

#[test]
fn run_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(
		tmp.path(),
		"incl.toml",
		"[[rules]]\nsrc = \"src/page.txt\"\ndest = \"out\"\n",
	)?;
	common::write_file(tmp.path(), "src/page.txt", "#{include \"gone.txt\"}")?;

	let mut cmd = common::incl_cmd();
	let output = cmd
		.arg("run")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert_eq!(output.status.code(), Some(1));

	let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["ok"], false);
	assert_eq!(json["tasks"], 1);
	assert_eq!(json["written"][0], "out/page.txt");
	assert_eq!(json["errors"][0]["kind"], "unresolved_include");

	Ok(())
}

#[test]
fn run_without_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::incl_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no incl.toml found"));

	Ok(())
}

#[test]
fn run_rejects_format_without_capture_group() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(
		tmp.path(),
		"incl.toml",
		"[formats]\n\".txt\" = 'include (.*) (.*)'\n\n[[rules]]\nsrc = \"src/*.txt\"\ndest = \"out\"\n",
	)?;
	common::write_file(tmp.path(), "src/a.txt", "plain")?;

	let mut cmd = common::incl_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("invalid directive format"));

	assert!(!tmp.path().join("out").exists());

	Ok(())
}

#[test]
fn run_with_single_job() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_project(tmp.path())?;

	let mut cmd = common::incl_cmd();
	cmd.arg("run")
		.arg("--jobs")
		.arg("1")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let content = std::fs::read_to_string(tmp.path().join("out/frag.txt"))?;
	assert_eq!(content, "1\n2");

	Ok(())
}

#[test]
fn run_verbose_logs_loaded_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_project(tmp.path())?;

	let mut cmd = common::incl_cmd();
	cmd.arg("run")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("loaded config"))
		.stderr(predicates::str::contains("incl.toml"));

	Ok(())
}
