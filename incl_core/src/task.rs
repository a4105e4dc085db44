use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use crate::IncludeError;
use crate::collector::ErrorCollector;
use crate::config::RunMode;
use crate::config::SearchRoot;
use crate::directive::DirectiveSet;
use crate::resolver::resolve_include;
use crate::substitute::substitute;

/// One source file to process, produced by rule expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
	/// Path of the source file.
	pub source: PathBuf,
	/// Destination directory declared by the rule.
	pub destination_dir: PathBuf,
	/// Path of the output beneath `destination_dir`.
	pub relative_output: PathBuf,
}

impl FileTask {
	/// Full path of the file this task produces.
	pub fn destination_path(&self) -> PathBuf {
		self.destination_dir.join(&self.relative_output)
	}
}

/// Run-wide inputs shared by every task.
#[derive(Debug, Clone, Copy)]
pub struct TaskContext<'a> {
	/// Project root used for relative search roots.
	pub root: &'a Path,
	pub directives: &'a DirectiveSet,
	pub search_roots: &'a [SearchRoot],
	pub mode: RunMode,
}

/// An output whose current content differs from what a run would write.
#[derive(Debug, Clone)]
pub struct StaleOutput {
	pub source: PathBuf,
	pub destination: PathBuf,
	/// Current destination content, or `None` when the file is missing.
	pub current: Option<String>,
	pub expected: String,
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum TaskOutcome {
	/// The destination was written.
	Written(PathBuf),
	/// Check mode: the destination already holds the expected content.
	UpToDate(PathBuf),
	/// Check mode: the destination is missing or differs.
	Stale(StaleOutput),
	/// A step failed and its error was recorded. Nothing was written.
	Failed,
}

/// Process one file: substitute its directives and persist the result.
///
/// Unresolvable or unreadable includes are recorded and left verbatim, and
/// the file is still written. Failing to read the source, create the
/// destination directory, or write the output is recorded and ends the
/// task without output.
pub fn run_task(task: &FileTask, ctx: &TaskContext<'_>, errors: &ErrorCollector) -> TaskOutcome {
	let matcher = match ctx.directives.for_path(&task.source) {
		Ok(matcher) => matcher,
		Err(error) => {
			errors.push(error);
			return TaskOutcome::Failed;
		}
	};

	let content = match std::fs::read_to_string(&task.source) {
		Ok(content) => content,
		Err(source) => {
			errors.push(IncludeError::Read {
				path: task.source.clone(),
				source,
			});
			return TaskOutcome::Failed;
		}
	};

	let fetch = |referenced_path: &str| {
		let Some(resolved) = resolve_include(ctx.root, &task.source, ctx.search_roots, referenced_path)
		else {
			return Err(IncludeError::UnresolvedInclude {
				path: referenced_path.to_string(),
				file: task.source.clone(),
			});
		};
		std::fs::read_to_string(&resolved).map_err(|source| IncludeError::Read {
			path: resolved,
			source,
		})
	};
	let output = substitute(&content, matcher, fetch, errors);
	let destination = task.destination_path();

	match ctx.mode {
		RunMode::Write => write_output(&destination, &output, errors),
		RunMode::Check => compare_output(task, destination, output, errors),
	}
}

fn write_output(destination: &Path, output: &str, errors: &ErrorCollector) -> TaskOutcome {
	if let Some(dir) = destination.parent() {
		// `create_dir_all` treats a directory created concurrently by a sibling
		// task as success.
		if let Err(source) = std::fs::create_dir_all(dir) {
			errors.push(IncludeError::DirectoryCreate {
				path: dir.to_path_buf(),
				source,
			});
			return TaskOutcome::Failed;
		}
	}

	if let Err(source) = std::fs::write(destination, output) {
		errors.push(IncludeError::Write {
			path: destination.to_path_buf(),
			source,
		});
		return TaskOutcome::Failed;
	}

	tracing::debug!(destination = %destination.display(), "wrote output");
	TaskOutcome::Written(destination.to_path_buf())
}

fn compare_output(
	task: &FileTask,
	destination: PathBuf,
	expected: String,
	errors: &ErrorCollector,
) -> TaskOutcome {
	let current = match std::fs::read_to_string(&destination) {
		Ok(current) => Some(current),
		Err(error) if error.kind() == ErrorKind::NotFound => None,
		Err(source) => {
			errors.push(IncludeError::Read {
				path: destination,
				source,
			});
			return TaskOutcome::Failed;
		}
	};

	if current.as_deref() == Some(expected.as_str()) {
		return TaskOutcome::UpToDate(destination);
	}

	tracing::debug!(destination = %destination.display(), "output is stale");
	TaskOutcome::Stale(StaleOutput {
		source: task.source.clone(),
		destination,
		current,
		expected,
	})
}
