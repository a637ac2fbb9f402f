#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use similar::{Algorithm, DiffTag, capture_diff_slices};

/// Result of comparing a student's output with the master output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Same lines, same count.
    Match,
    /// The program printed nothing.
    NoOutput,
    /// The outputs differ; `lines` is the annotated diff.
    ///
    /// Lines are prefixed `"  "` (common), `"- "` (expected only), `"+ "`
    /// (received only) or `"? "` (markers under the characters that changed
    /// in the line above).
    Mismatch {
        /// annotated diff, one entry per line, without line terminators
        lines: Vec<String>,
    },
}

impl DiffOutcome {
    /// Whether the outputs matched.
    pub fn is_match(&self) -> bool {
        matches!(self, DiffOutcome::Match)
    }
}

/// Splits `text` into lines, keeping each line's `\n` terminator.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Compares `expected` (master) with `actual` (student) line by line.
pub fn diff_lines<S: AsRef<str>>(expected: &[S], actual: &[S]) -> DiffOutcome {
    if actual.is_empty() {
        return DiffOutcome::NoOutput;
    }

    let expected: Vec<&str> = expected.iter().map(AsRef::as_ref).collect();
    let actual: Vec<&str> = actual.iter().map(AsRef::as_ref).collect();

    if expected == actual {
        return DiffOutcome::Match;
    }

    let mut lines = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &expected, &actual) {
        let (tag, old, new) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                lines.extend(expected[old].iter().map(|l| format!("  {}", strip(l))));
            }
            DiffTag::Delete => {
                lines.extend(expected[old].iter().map(|l| format!("- {}", strip(l))));
            }
            DiffTag::Insert => {
                lines.extend(actual[new].iter().map(|l| format!("+ {}", strip(l))));
            }
            DiffTag::Replace => {
                let removed = &expected[old];
                let added = &actual[new];
                for i in 0..removed.len().max(added.len()) {
                    match (removed.get(i), added.get(i)) {
                        (Some(a), Some(b)) => {
                            lines.push(format!("- {}", strip(a)));
                            lines.push(format!("+ {}", strip(b)));
                            let hint = change_markers(strip(a), strip(b));
                            if !hint.is_empty() {
                                lines.push(format!("? {hint}"));
                            }
                        }
                        (Some(a), None) => lines.push(format!("- {}", strip(a))),
                        (None, Some(b)) => lines.push(format!("+ {}", strip(b))),
                        (None, None) => {}
                    }
                }
            }
        }
    }

    DiffOutcome::Mismatch { lines }
}

/// Drops the line terminator.
fn strip(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Builds a marker line aligned under `received`: `^` for replaced
/// characters, `+` for inserted ones, `-` where characters went missing.
fn change_markers(expected: &str, received: &str) -> String {
    let old: Vec<char> = expected.chars().collect();
    let new: Vec<char> = received.chars().collect();

    let mut hint = String::new();
    for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
        let (tag, _, new_range) = op.as_tag_tuple();
        let marker = match tag {
            DiffTag::Equal => ' ',
            DiffTag::Replace => '^',
            DiffTag::Insert => '+',
            DiffTag::Delete => {
                hint.push('-');
                continue;
            }
        };
        hint.extend(std::iter::repeat_n(marker, new_range.len()));
    }

    hint.trim_end().to_string()
}
