//! `incl_core` is the engine behind the `incl` build-time preprocessor. It
//! finds inline directives such as `#{include "partials/header.txt"}` in
//! source files and replaces each one with the content of the referenced
//! file, writing the result into a destination tree.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Rules (glob + destination)
//!   → Rule expander (glob matching, one file task per match)
//!   → File task runner (per file, on a bounded worker pool)
//!       → Directive matcher (per-extension activation pattern)
//!       → Path resolver (ordered search roots, first match wins)
//!       → Substitution (single pass, prefix-preserving re-indent)
//!   → Destination files + aggregated error report
//! ```
//!
//! Included content is never scanned for directives itself.
//!
//! ## Modules
//!
//! - [`config`]: Format table, rules, search roots, and `incl.toml` loading.
//! - [`directive`]: Compiles directive formats into activation patterns.
//! - [`resolver`]: Resolves referenced paths against search roots.
//! - [`substitute`]: Replaces directives with re-indented file content.
//! - [`rules`]: Expands rules into file tasks.
//! - [`task`]: Processes a single file task.
//! - [`pipeline`]: Runs both stages and aggregates errors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use incl_core::pipeline;
//! use incl_core::RunConfig;
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let config = RunConfig::load(root).unwrap();
//! let report = pipeline::run(root, &config).unwrap();
//! if !report.is_ok() {
//!     eprintln!("{} error(s)", report.errors.len());
//! }
//! ```

pub use collector::*;
pub use config::*;
pub use error::*;
pub use pipeline::ExpandReport;
pub use pipeline::RunReport;
pub use task::FileTask;
pub use task::StaleOutput;

mod collector;
pub mod config;
pub mod directive;
#[allow(unused_assignments)]
mod error;
pub mod pipeline;
pub mod resolver;
pub mod rules;
pub mod substitute;
pub mod task;
