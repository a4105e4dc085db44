use std::path::Path;
use std::path::PathBuf;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::IncludeError;
use crate::IncludeResult;
use crate::collector::ErrorCollector;
use crate::config::RunConfig;
use crate::directive::DirectiveSet;
use crate::rules::expand_rules;
use crate::task::FileTask;
use crate::task::StaleOutput;
use crate::task::TaskContext;
use crate::task::TaskOutcome;
use crate::task::run_task;

/// Aggregate result of a processing run.
#[derive(Debug, Default)]
pub struct RunReport {
	/// Number of file tasks produced by rule expansion.
	pub task_count: usize,
	/// Destination files written, sorted.
	pub written: Vec<PathBuf>,
	/// Check mode: destinations already holding the expected content.
	pub up_to_date: Vec<PathBuf>,
	/// Check mode: destinations that are missing or differ.
	pub stale: Vec<StaleOutput>,
	/// Every non-fatal error recorded by either stage, in no particular
	/// order.
	pub errors: Vec<IncludeError>,
}

impl RunReport {
	/// Returns true if no errors were recorded and nothing is stale.
	pub fn is_ok(&self) -> bool {
		self.errors.is_empty() && self.stale.is_empty()
	}
}

/// Result of expanding rules without processing any file.
#[derive(Debug, Default)]
pub struct ExpandReport {
	pub tasks: Vec<FileTask>,
	pub errors: Vec<IncludeError>,
}

/// Expand the configured rules into file tasks.
pub fn expand(root: &Path, config: &RunConfig) -> IncludeResult<ExpandReport> {
	let errors = ErrorCollector::new();
	let pool = worker_pool(config.jobs, "expand")?;
	let tasks = expand_rules(root, &config.rules, &pool, &errors);

	Ok(ExpandReport {
		tasks,
		errors: errors.into_errors(),
	})
}

/// Expand every rule, then process every resulting file, each stage on its
/// own pool of `config.jobs` workers.
///
/// Returns `Err` only for fatal configuration problems, before any file is
/// written. Everything else is collected into [`RunReport::errors`] and
/// never stops the remaining tasks. Files written before another task fails
/// stay on disk.
pub fn run(root: &Path, config: &RunConfig) -> IncludeResult<RunReport> {
	let directives = DirectiveSet::compile(&config.formats)?;
	tracing::info!(
		rules = config.rules.len(),
		jobs = config.jobs,
		mode = ?config.mode,
		"starting run"
	);

	let ExpandReport {
		tasks,
		errors: mut all_errors,
	} = expand(root, config)?;

	// A file type with no format is a configuration bug, reported before any
	// output is produced.
	for task in &tasks {
		directives.for_path(&task.source)?;
	}

	let errors = ErrorCollector::new();
	let ctx = TaskContext {
		root,
		directives: &directives,
		search_roots: &config.search_roots,
		mode: config.mode,
	};
	let pool = worker_pool(config.jobs, "process")?;
	let outcomes: Vec<TaskOutcome> = pool.install(|| {
		tasks
			.par_iter()
			.map(|task| run_task(task, &ctx, &errors))
			.collect()
	});

	let mut report = RunReport {
		task_count: tasks.len(),
		..RunReport::default()
	};
	for outcome in outcomes {
		match outcome {
			TaskOutcome::Written(path) => report.written.push(path),
			TaskOutcome::UpToDate(path) => report.up_to_date.push(path),
			TaskOutcome::Stale(stale) => report.stale.push(stale),
			TaskOutcome::Failed => {}
		}
	}
	report.written.sort();
	report.up_to_date.sort();
	report
		.stale
		.sort_by(|a, b| a.destination.cmp(&b.destination));

	all_errors.extend(errors.into_errors());
	report.errors = all_errors;

	tracing::info!(
		tasks = report.task_count,
		written = report.written.len(),
		stale = report.stale.len(),
		errors = report.errors.len(),
		"finished run"
	);

	Ok(report)
}

fn worker_pool(jobs: usize, stage: &'static str) -> IncludeResult<ThreadPool> {
	ThreadPoolBuilder::new()
		.num_threads(jobs.max(1))
		.thread_name(move |index| format!("incl-{stage}-{index}"))
		.build()
		.map_err(|e| IncludeError::WorkerPool(e.to_string()))
}
