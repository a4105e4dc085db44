use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::IncludeError;
use crate::IncludeResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["incl.toml", ".incl.toml", ".config/incl.toml"];

/// Format table key used when a file's extension has no entry of its own.
pub const WILDCARD_EXTENSION: &str = "*";

/// Search root spelling that stands for the directory of the referencing
/// file.
pub const SIBLING_ROOT: &str = "./";

/// Built-in directive syntax: line comments for `.js`, hash markers for
/// everything else.
pub const DEFAULT_FORMATS: [(&str, &str); 2] = [
	(".js", r#"//\{include "(.*?)"\}"#),
	(WILDCARD_EXTENSION, r#"#\{include "(.*?)"\}"#),
];

/// Mapping from file extension (with the leading dot, e.g. `.css`) to a
/// directive pattern template containing exactly one capture group for the
/// referenced path.
///
/// Lookups for extensions without an entry fall back to the `*` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTable {
	entries: BTreeMap<String, String>,
}

impl Default for FormatTable {
	fn default() -> Self {
		Self {
			entries: DEFAULT_FORMATS
				.iter()
				.map(|(ext, pattern)| ((*ext).to_string(), (*pattern).to_string()))
				.collect(),
		}
	}
}

impl FormatTable {
	/// A table with no entries at all, not even the wildcard.
	pub fn empty() -> Self {
		Self {
			entries: BTreeMap::new(),
		}
	}

	/// The built-in defaults with `overrides` merged on top. An override
	/// replaces the default of the same key.
	pub fn with_overrides<I, K, V>(overrides: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut table = Self::default();
		for (extension, pattern) in overrides {
			table.insert(extension, pattern);
		}
		table
	}

	pub fn insert(&mut self, extension: impl Into<String>, pattern: impl Into<String>) {
		self.entries.insert(extension.into(), pattern.into());
	}

	/// Look up the pattern template for `extension`, falling back to the
	/// wildcard entry.
	pub fn get(&self, extension: &str) -> Option<&str> {
		self.entries
			.get(extension)
			.or_else(|| self.entries.get(WILDCARD_EXTENSION))
			.map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(ext, pattern)| (ext.as_str(), pattern.as_str()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// A base directory used to resolve the path named by a directive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
#[non_exhaustive]
pub enum SearchRoot {
	/// The directory containing the file being processed (`./`).
	SiblingOfFile,
	/// A literal directory. Relative directories are taken from the project
	/// root.
	Dir(PathBuf),
}

impl From<&str> for SearchRoot {
	fn from(value: &str) -> Self {
		if value == SIBLING_ROOT {
			Self::SiblingOfFile
		} else {
			Self::Dir(PathBuf::from(value))
		}
	}
}

impl From<String> for SearchRoot {
	fn from(value: String) -> Self {
		Self::from(value.as_str())
	}
}

/// One declared mapping from a set of source files to a destination
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
	/// Glob pattern selecting source files.
	#[serde(rename = "src", alias = "source")]
	pub source_pattern: String,
	/// Directory receiving the processed files.
	#[serde(rename = "dest", alias = "destination")]
	pub destination_dir: PathBuf,
}

impl Rule {
	pub fn new(source_pattern: impl Into<String>, destination_dir: impl Into<PathBuf>) -> Self {
		Self {
			source_pattern: source_pattern.into(),
			destination_dir: destination_dir.into(),
		}
	}
}

/// Configuration loaded from an `incl.toml` file.
///
/// ```toml
/// include = ["./", "shared/partials"]
/// jobs = 4
///
/// [formats]
/// ".css" = '/\*\{include "(.*?)"\}\*/'
///
/// [[rules]]
/// src = "src/**/*.js"
/// dest = "dist"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct InclConfig {
	/// Ordered search roots. First match wins.
	#[serde(default)]
	pub include: Option<Vec<SearchRoot>>,
	/// Directive formats merged over the built-in defaults.
	#[serde(default)]
	pub formats: BTreeMap<String, String>,
	#[serde(default)]
	pub rules: Vec<Rule>,
	/// Worker pool size. Defaults to the number of available processing
	/// units.
	#[serde(default)]
	pub jobs: Option<usize>,
}

impl InclConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> IncludeResult<Option<InclConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::parse(&content).map(Some)
	}

	pub fn parse(content: &str) -> IncludeResult<InclConfig> {
		toml::from_str(content).map_err(|e| IncludeError::ConfigParse(e.to_string()))
	}
}

/// Whether a run writes its outputs or only compares them with what is
/// already on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
	#[default]
	Write,
	Check,
}

/// Everything a single processing run needs. Treated as read-only once the
/// run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
	pub formats: FormatTable,
	pub search_roots: Vec<SearchRoot>,
	pub rules: Vec<Rule>,
	/// Worker pool size for each pipeline stage.
	pub jobs: usize,
	pub mode: RunMode,
}

impl RunConfig {
	/// A run over `rules` with default formats, the sibling search root, and
	/// one worker per available processing unit.
	pub fn new(rules: Vec<Rule>) -> Self {
		Self {
			formats: FormatTable::default(),
			search_roots: vec![SearchRoot::SiblingOfFile],
			rules,
			jobs: default_jobs(),
			mode: RunMode::Write,
		}
	}

	pub fn from_config(config: InclConfig) -> Self {
		let mut run = Self::new(config.rules).with_formats(FormatTable::with_overrides(config.formats));
		if let Some(roots) = config.include {
			run = run.with_search_roots(roots);
		}
		if let Some(jobs) = config.jobs {
			run = run.with_jobs(jobs);
		}
		run
	}

	/// Build the run from the config file discovered at `root`.
	pub fn load(root: &Path) -> IncludeResult<Self> {
		let Some(config) = InclConfig::load(root)? else {
			return Err(IncludeError::MissingConfig(root.display().to_string()));
		};
		Ok(Self::from_config(config))
	}

	#[must_use]
	pub fn with_formats(mut self, formats: FormatTable) -> Self {
		self.formats = formats;
		self
	}

	#[must_use]
	pub fn with_search_roots(mut self, search_roots: Vec<SearchRoot>) -> Self {
		self.search_roots = search_roots;
		self
	}

	/// Set the worker pool size. Zero is treated as one.
	#[must_use]
	pub fn with_jobs(mut self, jobs: usize) -> Self {
		self.jobs = jobs.max(1);
		self
	}

	#[must_use]
	pub fn with_mode(mut self, mode: RunMode) -> Self {
		self.mode = mode;
		self
	}
}

/// Number of available processing units, or `1` when it cannot be
/// determined.
pub fn default_jobs() -> usize {
	std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
