use incl_core::AnyEmptyResult;

mod common;

#[test]
fn list_shows_source_and_destination() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::sample_project(tmp.path())?;

	let mut cmd = common::incl_cmd();
	cmd.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("src/frag.txt -> out/frag.txt"))
		.stdout(predicates::str::contains("src/main.txt -> out/main.txt"));

	// Listing never writes.
	assert!(!tmp.path().join("out").exists());

	Ok(())
}

#[test]
fn list_without_matches() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(
		tmp.path(),
		"incl.toml",
		"[[rules]]\nsrc = \"src/*.md\"\ndest = \"out\"\n",
	)?;

	let mut cmd = common::incl_cmd();
	cmd.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No source files matched."));

	Ok(())
}

#[test]
fn list_reports_malformed_glob() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_file(
		tmp.path(),
		"incl.toml",
		"[[rules]]\nsrc = \"src/[.txt\"\ndest = \"out\"\n",
	)?;

	let mut cmd = common::incl_cmd();
	cmd.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("failed to match pattern `src/[.txt`"));

	Ok(())
}
