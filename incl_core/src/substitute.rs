use crate::IncludeResult;
use crate::collector::ErrorCollector;
use crate::directive::DirectiveMatcher;

/// Replace every directive in `content` with the text returned by `fetch`
/// for its referenced path, in a single left-to-right pass.
///
/// Inserted text is re-indented with the directive's prefix and is never
/// scanned again. When `fetch` fails the error is pushed to `errors` and the
/// directive is kept verbatim; sibling directives are unaffected. Content
/// without directives is returned unchanged.
pub fn substitute<F>(
	content: &str,
	matcher: &DirectiveMatcher,
	mut fetch: F,
	errors: &ErrorCollector,
) -> String
where
	F: FnMut(&str) -> IncludeResult<String>,
{
	let mut output = String::with_capacity(content.len());
	let mut cursor = 0;

	for occurrence in matcher.occurrences(content) {
		output.push_str(&content[cursor..occurrence.span.start]);

		match fetch(occurrence.referenced_path) {
			Ok(included) => {
				output.push_str(occurrence.prefix);
				push_reindented(&mut output, &included, occurrence.prefix);
			}
			Err(error) => {
				errors.push(error);
				output.push_str(&content[occurrence.span.clone()]);
			}
		}

		cursor = occurrence.span.end;
	}

	output.push_str(&content[cursor..]);
	output
}

/// Follow every line break in `content` with `prefix`. The first line is left
/// as is. `\r\n` counts as a single break.
pub fn reindent(content: &str, prefix: &str) -> String {
	let mut output = String::with_capacity(content.len());
	push_reindented(&mut output, content, prefix);
	output
}

fn push_reindented(output: &mut String, content: &str, prefix: &str) {
	for line in content.split_inclusive('\n') {
		output.push_str(line);
		if line.ends_with('\n') {
			output.push_str(prefix);
		}
	}
}
