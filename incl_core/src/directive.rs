use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use regex::Regex;

use crate::IncludeError;
use crate::IncludeResult;
use crate::config::FormatTable;
use crate::config::WILDCARD_EXTENSION;

/// Compiled activation pattern for one directive format.
///
/// The pattern is the format template preceded by a lazy, line-anchored
/// prefix capture: `(?m)^(.*?)(?:<template>)`. Group 1 is the prefix, group 2
/// the referenced path. Neither can extend past the end of a line. The
/// template is grouped so a top-level `|` stays behind the anchor.
#[derive(Debug, Clone)]
pub struct DirectiveMatcher {
	extension: String,
	regex: Regex,
}

/// A single directive found in a file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveOccurrence<'a> {
	/// Text preceding the directive marker on its line.
	pub prefix: &'a str,
	/// The path named by the directive, verbatim.
	pub referenced_path: &'a str,
	/// Byte range of the full match (prefix included).
	pub span: Range<usize>,
}

impl DirectiveMatcher {
	pub fn new(extension: &str, template: &str) -> IncludeResult<Self> {
		let regex = Regex::new(&format!("(?m)^(.*?)(?:{template})")).map_err(|e| {
			IncludeError::Configuration {
				extension: extension.to_string(),
				reason: e.to_string(),
			}
		})?;

		// Implicit whole-match group, the prefix, and the path.
		if regex.captures_len() != 3 {
			return Err(IncludeError::Configuration {
				extension: extension.to_string(),
				reason: format!(
					"expected exactly one capture group, found {}",
					regex.captures_len().saturating_sub(2)
				),
			});
		}

		Ok(Self {
			extension: extension.to_string(),
			regex,
		})
	}

	/// The format table key this matcher was built from.
	pub fn extension(&self) -> &str {
		&self.extension
	}

	/// Every directive in `content`, left to right and non-overlapping.
	pub fn occurrences<'a>(
		&'a self,
		content: &'a str,
	) -> impl Iterator<Item = DirectiveOccurrence<'a>> + 'a {
		self.regex.captures_iter(content).filter_map(|caps| {
			let whole = caps.get(0)?;
			Some(DirectiveOccurrence {
				prefix: caps.get(1).map_or("", |m| m.as_str()),
				referenced_path: caps.get(2).map_or("", |m| m.as_str()),
				span: whole.range(),
			})
		})
	}
}

/// Build the activation pattern for files with `extension`, falling back to
/// the wildcard entry of `formats`.
pub fn build_pattern(formats: &FormatTable, extension: &str) -> IncludeResult<DirectiveMatcher> {
	let Some(template) = formats.get(extension) else {
		return Err(missing_format(extension));
	};
	DirectiveMatcher::new(extension, template)
}

/// Every format of a run, compiled once before any file is processed.
#[derive(Debug, Clone)]
pub struct DirectiveSet {
	matchers: HashMap<String, DirectiveMatcher>,
}

impl DirectiveSet {
	pub fn compile(formats: &FormatTable) -> IncludeResult<Self> {
		let matchers = formats
			.iter()
			.map(|(extension, template)| {
				DirectiveMatcher::new(extension, template).map(|m| (extension.to_string(), m))
			})
			.collect::<IncludeResult<HashMap<_, _>>>()?;

		Ok(Self { matchers })
	}

	/// The matcher for `extension`, or the wildcard matcher when the
	/// extension has no entry of its own.
	pub fn for_extension(&self, extension: &str) -> IncludeResult<&DirectiveMatcher> {
		self.matchers
			.get(extension)
			.or_else(|| self.matchers.get(WILDCARD_EXTENSION))
			.ok_or_else(|| missing_format(extension))
	}

	/// Matcher for the file at `path`.
	pub fn for_path(&self, path: &Path) -> IncludeResult<&DirectiveMatcher> {
		self.for_extension(&file_extension(path))
	}
}

/// The extension of `path` including its leading dot, or an empty string.
pub fn file_extension(path: &Path) -> String {
	path.extension()
		.and_then(|ext| ext.to_str())
		.map(|ext| format!(".{ext}"))
		.unwrap_or_default()
}

fn missing_format(extension: &str) -> IncludeError {
	let extension = if extension.is_empty() {
		"<none>"
	} else {
		extension
	};
	IncludeError::Configuration {
		extension: extension.to_string(),
		reason: format!("no format entry and no `{WILDCARD_EXTENSION}` fallback"),
	}
}
