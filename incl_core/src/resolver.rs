use std::path::Path;
use std::path::PathBuf;

use crate::config::SearchRoot;

/// Resolve `referenced_path` against `search_roots` in declared order and
/// return the first candidate that exists.
///
/// [`SearchRoot::SiblingOfFile`] resolves next to `referencing_file`; a
/// relative [`SearchRoot::Dir`] is taken from `root`. Returns `None` when no
/// candidate exists; the caller decides how to report that.
pub fn resolve_include(
	root: &Path,
	referencing_file: &Path,
	search_roots: &[SearchRoot],
	referenced_path: &str,
) -> Option<PathBuf> {
	search_roots
		.iter()
		.map(|search_root| candidate_path(root, referencing_file, search_root, referenced_path))
		.find(|candidate| candidate.exists())
}

fn candidate_path(
	root: &Path,
	referencing_file: &Path,
	search_root: &SearchRoot,
	referenced_path: &str,
) -> PathBuf {
	match search_root {
		SearchRoot::SiblingOfFile => {
			let dir = referencing_file.parent().unwrap_or_else(|| Path::new(""));
			dir.join(referenced_path)
		}
		SearchRoot::Dir(dir) => root.join(dir).join(referenced_path),
	}
}
