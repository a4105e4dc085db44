use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobMatcher;
use ignore::WalkBuilder;
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::IncludeError;
use crate::collector::ErrorCollector;
use crate::config::Rule;
use crate::task::FileTask;

const GLOB_META_CHARS: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Expand every rule into file tasks on `pool`.
///
/// Tasks keep rule order, and within a rule are sorted by source path.
/// Glob failures are recorded in `errors` without stopping the other rules.
pub fn expand_rules(
	root: &Path,
	rules: &[Rule],
	pool: &ThreadPool,
	errors: &ErrorCollector,
) -> Vec<FileTask> {
	pool.install(|| {
		rules
			.par_iter()
			.flat_map_iter(|rule| expand_rule(root, rule, errors))
			.collect()
	})
}

/// Match one rule's pattern against the filesystem. A pattern matching
/// nothing yields no tasks and no error.
pub fn expand_rule(root: &Path, rule: &Rule, errors: &ErrorCollector) -> Vec<FileTask> {
	let pattern = normalize_pattern(&rule.source_pattern);
	let destination_dir = root.join(&rule.destination_dir);
	let is_absolute = Path::new(pattern).is_absolute();
	let (base, has_glob) = split_glob_base(pattern);

	let mut sources = if has_glob {
		match build_matcher(pattern) {
			Ok(matcher) => walk_matches(root, &base, &matcher, is_absolute, pattern, errors),
			Err(error) => {
				errors.push(error);
				return Vec::new();
			}
		}
	} else {
		let path = root.join(pattern);
		if path.is_file() { vec![path] } else { Vec::new() }
	};
	sources.sort();

	// Output paths keep the structure below the pattern's literal base. A
	// literal pattern's base is its parent directory.
	let output_base = if has_glob {
		root.join(&base)
	} else {
		root.join(pattern)
			.parent()
			.map(Path::to_path_buf)
			.unwrap_or_else(|| root.to_path_buf())
	};

	let tasks: Vec<FileTask> = sources
		.into_iter()
		.filter_map(|source| {
			let relative_output = if is_absolute {
				PathBuf::from(source.file_name()?)
			} else {
				match source.strip_prefix(&output_base) {
					Ok(relative) => relative.to_path_buf(),
					Err(_) => PathBuf::from(source.file_name()?),
				}
			};

			Some(FileTask {
				source,
				destination_dir: destination_dir.clone(),
				relative_output,
			})
		})
		.collect();

	tracing::debug!(pattern, matched = tasks.len(), "expanded rule");
	tasks
}

fn normalize_pattern(pattern: &str) -> &str {
	let mut pattern = pattern;
	while let Some(rest) = pattern.strip_prefix("./") {
		pattern = rest;
	}
	pattern
}

/// Split `pattern` into the directory made of its leading literal components
/// and whether any glob syntax follows.
fn split_glob_base(pattern: &str) -> (PathBuf, bool) {
	let mut literal = Vec::new();
	for component in pattern.split('/') {
		if component.contains(GLOB_META_CHARS) {
			return (PathBuf::from(literal.join("/")), true);
		}
		literal.push(component);
	}

	(PathBuf::from(pattern), false)
}

fn names_hidden_entries(pattern: &str) -> bool {
	pattern
		.split('/')
		.skip_while(|component| !component.contains(GLOB_META_CHARS))
		.any(|component| component.starts_with('.') && component != "." && component != "..")
}

fn build_matcher(pattern: &str) -> Result<GlobMatcher, IncludeError> {
	GlobBuilder::new(pattern)
		.literal_separator(true)
		.build()
		.map(|glob| glob.compile_matcher())
		.map_err(|e| {
			IncludeError::Glob {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			}
		})
}

fn walk_matches(
	root: &Path,
	base: &Path,
	matcher: &GlobMatcher,
	is_absolute: bool,
	pattern: &str,
	errors: &ErrorCollector,
) -> Vec<PathBuf> {
	let start = root.join(base);
	if !start.is_dir() {
		return Vec::new();
	}

	// Dotfiles only match when the glob part of the pattern names them.
	let skip_hidden = !names_hidden_entries(pattern);
	let mut matches = Vec::new();
	for entry in WalkBuilder::new(&start)
		.standard_filters(false)
		.hidden(skip_hidden)
		.build()
	{
		let entry = match entry {
			Ok(entry) => entry,
			Err(e) => {
				errors.push(IncludeError::Glob {
					pattern: pattern.to_string(),
					reason: e.to_string(),
				});
				continue;
			}
		};

		if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
			continue;
		}

		let path = entry.path();
		let candidate = if is_absolute {
			path
		} else {
			path.strip_prefix(root).unwrap_or(path)
		};

		if matcher.is_match(candidate) {
			matches.push(path.to_path_buf());
		}
	}

	matches
}
