use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum IncludeError {
	#[error(transparent)]
	#[diagnostic(code(incl::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(incl::config_parse),
		help("check that incl.toml is valid TOML with `include`, `[formats]` and `[[rules]]`")
	)]
	ConfigParse(String),

	#[error("no incl.toml found in `{0}`")]
	#[diagnostic(
		code(incl::missing_config),
		help("run `incl init` to create a sample configuration")
	)]
	MissingConfig(String),

	#[error("invalid directive format for `{extension}`: {reason}")]
	#[diagnostic(
		code(incl::configuration),
		help("each format must be a valid regex with exactly one capture group for the path")
	)]
	Configuration { extension: String, reason: String },

	#[error("failed to match pattern `{pattern}`: {reason}")]
	#[diagnostic(code(incl::glob))]
	Glob { pattern: String, reason: String },

	#[error("could not resolve include `{path}` in `{}`", .file.display())]
	#[diagnostic(
		code(incl::unresolved_include),
		help("check the path and the order of the `include` search roots")
	)]
	UnresolvedInclude { path: String, file: PathBuf },

	#[error("failed to read `{}`", .path.display())]
	#[diagnostic(code(incl::read))]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write `{}`", .path.display())]
	#[diagnostic(code(incl::write))]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to create directory `{}`", .path.display())]
	#[diagnostic(code(incl::create_dir))]
	DirectoryCreate {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to start worker pool: {0}")]
	#[diagnostic(code(incl::worker_pool))]
	WorkerPool(String),
}

impl IncludeError {
	/// Short machine-readable name of the error kind.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Io(_) => "io",
			Self::ConfigParse(_) => "config_parse",
			Self::MissingConfig(_) => "missing_config",
			Self::Configuration { .. } => "configuration",
			Self::Glob { .. } => "glob",
			Self::UnresolvedInclude { .. } => "unresolved_include",
			Self::Read { .. } => "read",
			Self::Write { .. } => "write",
			Self::DirectoryCreate { .. } => "create_dir",
			Self::WorkerPool(_) => "worker_pool",
		}
	}
}

pub type IncludeResult<T> = Result<T, IncludeError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
