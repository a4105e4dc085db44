use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Splice shared fragments into generated files with inline include directives.",
	long_about = "incl is a build-time preprocessor. It reads the rules in incl.toml, finds every \
	              `#{include \"path\"}` directive (`//{include \"path\"}` in .js files) in the \
	              matched sources, and writes copies with each directive replaced by the \
	              referenced file, indented to match the directive's line.\n\nQuick start:\n  \
	              incl init    Create a sample incl.toml\n  incl run     Process every rule\n  \
	              incl check   Verify generated files are up to date\n  incl list    Show \
	              which files each rule matches"
)]
pub struct InclCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Number of worker threads. Defaults to the `jobs` config value, then to
	/// the number of available processing units.
	#[arg(long, short, global = true)]
	pub jobs: Option<usize>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `incl.toml` in the project root.
	///
	/// If a config file already exists, this command is a no-op and exits
	/// successfully.
	Init,
	/// Process every rule and write the generated files.
	///
	/// Each source file matched by a rule is copied to the rule's destination
	/// with its include directives replaced. Problems with individual files or
	/// directives are reported after all files have been processed; the exit
	/// status is non-zero if any were found.
	Run {
		/// Output format for the run summary.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Check that every generated file is up to date without writing.
	///
	/// Exits with a non-zero status code if any output is missing, differs
	/// from what `incl run` would write, or could not be produced.
	Check {
		/// Show a line diff for each stale output.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List the source files matched by each rule and where they are written.
	List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
