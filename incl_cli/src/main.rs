use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use incl_cli::Commands;
use incl_cli::InclCli;
use incl_cli::OutputFormat;
use incl_core::IncludeError;
use incl_core::InclConfig;
use incl_core::RunConfig;
use incl_core::RunMode;
use incl_core::RunReport;
use incl_core::pipeline;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

const SAMPLE_CONFIG: &str = r#"# incl configuration

# Search roots for include paths, tried in order. "./" is the directory of
# the file containing the directive.
include = ["./"]

# Directive formats per file extension, merged over the defaults:
#   ".js" = '//\{include "(.*?)"\}'
#   "*"   = '#\{include "(.*?)"\}'
# [formats]
# ".css" = '/\*\{include "(.*?)"\}\*/'

# Worker threads. Defaults to the number of available processing units.
# jobs = 4

[[rules]]
src = "src/**/*"
dest = "dist"
"#;

fn main() {
	let args = InclCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Init) => run_init(&args).map(|()| true),
		Some(Commands::Run { format }) => run_run(&args, format),
		Some(Commands::Check { diff, format }) => run_check(&args, diff, format),
		Some(Commands::List) => run_list(&args),
		None => {
			eprintln!("No subcommand specified. Run `incl --help` for usage.");
			process::exit(1);
		}
	};

	match result {
		Ok(true) => {}
		Ok(false) => process::exit(1),
		Err(e) => {
			// Render through miette for error codes and help text.
			match e.downcast::<IncludeError>() {
				Ok(incl_err) => {
					let report: miette::Report = (*incl_err).into();
					eprintln!("{report:?}");
				}
				Err(e) => {
					eprintln!("{} {e}", colored!("error:", red));
				}
			}
			process::exit(2);
		}
	}
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_filter = if verbose {
		"incl=debug,incl_core=debug"
	} else {
		"error"
	};
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

fn resolve_root(args: &InclCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_run_config(args: &InclCli, root: &Path) -> Result<RunConfig, IncludeError> {
	let mut config = RunConfig::load(root)?;
	tracing::debug!(
		root = %root.display(),
		config = ?InclConfig::resolve_path(root),
		rules = config.rules.len(),
		"loaded config"
	);
	if let Some(jobs) = args.jobs {
		config = config.with_jobs(jobs);
	}
	Ok(config)
}

fn run_init(args: &InclCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	if let Some(existing) = InclConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("incl.toml");
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Edit the [[rules]] in incl.toml to point at your sources");
	println!("  2. Add directives to your files:");
	println!("     #{{include \"partials/header.txt\"}}");
	println!("  3. Run `incl run` to generate the outputs");

	Ok(())
}

/// Run every rule and write outputs. Returns `false` when any error was
/// recorded.
fn run_run(args: &InclCli, format: OutputFormat) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = load_run_config(args, &root)?;
	let report = pipeline::run(&root, &config)?;
	let ok = report.is_ok();

	match format {
		OutputFormat::Json => {
			let written: Vec<String> = report
				.written
				.iter()
				.map(|path| make_relative(path, &root))
				.collect();
			let output = serde_json::json!({
				"ok": ok,
				"tasks": report.task_count,
				"written": written,
				"errors": errors_to_json(&report),
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if args.verbose {
				for path in &report.written {
					println!("  {}", make_relative(path, &root));
				}
			}
			print_errors(report.errors);
			let summary = format!(
				"Wrote {} of {} file(s).",
				report.written.len(),
				report.task_count
			);
			if ok {
				println!("{}", colored!(summary, green));
			} else {
				println!("{summary}");
			}
		}
	}

	Ok(ok)
}

/// Compare outputs with what a run would write. Returns `false` when
/// anything is stale or failed.
fn run_check(
	args: &InclCli,
	show_diff: bool,
	format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = load_run_config(args, &root)?.with_mode(RunMode::Check);
	let report = pipeline::run(&root, &config)?;
	let ok = report.is_ok();

	match format {
		OutputFormat::Json => {
			let stale: Vec<serde_json::Value> = report
				.stale
				.iter()
				.map(|entry| {
					serde_json::json!({
						"source": make_relative(&entry.source, &root),
						"destination": make_relative(&entry.destination, &root),
						"missing": entry.current.is_none(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": ok,
				"tasks": report.task_count,
				"stale": stale,
				"errors": errors_to_json(&report),
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			for entry in &report.stale {
				let destination = make_relative(&entry.destination, &root);
				let source = make_relative(&entry.source, &root);
				let state = if entry.current.is_some() {
					"out of date"
				} else {
					"missing"
				};
				eprintln!(
					"{} {destination} is {state} (from {source})",
					colored!("stale:", yellow)
				);
				if show_diff {
					print_diff(entry.current.as_deref().unwrap_or_default(), &entry.expected);
				}
			}
			let stale_count = report.stale.len();
			print_errors(report.errors);

			if ok {
				println!(
					"Check passed: all {} output(s) are up to date.",
					report.up_to_date.len()
				);
			} else if stale_count > 0 {
				eprintln!(
					"{stale_count} output(s) are stale. Run `incl run` to regenerate them."
				);
			}
		}
	}

	Ok(ok)
}

fn run_list(args: &InclCli) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = load_run_config(args, &root)?;
	let report = pipeline::expand(&root, &config)?;
	let ok = report.errors.is_empty();

	if report.tasks.is_empty() {
		println!("No source files matched.");
	} else {
		println!("{}", colored!("Files:", bold));
		for task in &report.tasks {
			println!(
				"  {} -> {}",
				make_relative(&task.source, &root),
				make_relative(&task.destination_path(), &root)
			);
		}
	}

	print_errors(report.errors);
	Ok(ok)
}

/// Print recorded errors as miette reports, sorted by message so output is
/// stable across runs.
fn print_errors(mut errors: Vec<IncludeError>) {
	errors.sort_by_cached_key(ToString::to_string);
	for error in errors {
		let report = miette::Report::new(error);
		eprintln!("{report:?}");
	}
}

fn errors_to_json(report: &RunReport) -> Vec<serde_json::Value> {
	let mut entries: Vec<serde_json::Value> = report
		.errors
		.iter()
		.map(|error| {
			serde_json::json!({
				"kind": error.kind(),
				"message": error_chain(error),
			})
		})
		.collect();
	entries.sort_by_key(|entry| entry["message"].as_str().unwrap_or_default().to_string());
	entries
}

/// The error message followed by each of its sources.
fn error_chain(error: &IncludeError) -> String {
	let mut message = error.to_string();
	let mut source = std::error::Error::source(error);
	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());
		source = cause.source();
	}
	message
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
	eprintln!();
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
