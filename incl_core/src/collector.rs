use std::sync::Mutex;
use std::sync::PoisonError;

use crate::IncludeError;

/// Append-only store of the non-fatal errors produced during one run.
///
/// Shared by reference between every worker of a pipeline stage. Append
/// order follows completion order and carries no meaning.
#[derive(Debug, Default)]
pub struct ErrorCollector {
	errors: Mutex<Vec<IncludeError>>,
}

impl ErrorCollector {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&self, error: IncludeError) {
		tracing::warn!(kind = error.kind(), "{error}");
		self.errors
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(error);
	}

	pub fn len(&self) -> usize {
		self.errors
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drain the collector, returning everything recorded so far.
	pub fn into_errors(self) -> Vec<IncludeError> {
		self.errors
			.into_inner()
			.unwrap_or_else(PoisonError::into_inner)
	}
}
