#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The plain-text rubric file a grader edits by hand.
//!
//! ```text
//! compiles: 0/1
//! runs: 0/1
//! #==============================#
//! # Instructor comments
//! #==============================#
//! free text written by the grader...
//! ```

use std::path::Path;

use anyhow::{Context, Result};

use crate::rubric::{Rubric, RubricError};

/// File name of the rubric artifact inside the working directory.
pub const RUBRIC_FILE: &str = "rubric.txt";

/// Border line around the comment section title.
pub const COMMENT_BORDER: &str = "#==============================#";

/// Title line of the comment section.
pub const COMMENT_TITLE: &str = "# Instructor comments";

/// Errors raised when reading back a grader-edited rubric.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExchangeError {
    /// The grader renamed or invented a criterion.
    #[error("line {line}: criterion `{name}` is not part of the rubric")]
    UnknownCriterion {
        /// 1-based line number
        line: usize,
        /// criterion name as written
        name: String,
    },
    /// A criterion line without the `name: mark/max` shape.
    #[error("line {line}: expected `name: mark/max`, found `{text}`")]
    Malformed {
        /// 1-based line number
        line: usize,
        /// offending line
        text: String,
    },
    /// The awarded mark is missing or not a number.
    #[error("line {line}: `{value}` is not a valid mark for `{name}`")]
    InvalidMark {
        /// 1-based line number
        line:  usize,
        /// criterion name
        name:  String,
        /// text found left of the `/`
        value: String,
    },
    /// The grader deleted a criterion line.
    #[error("criterion `{name}` is missing from the rubric file")]
    MissingCriterion {
        /// criterion name
        name: String,
    },
    /// Text appeared between the delimiter lines of the comment header.
    #[error("line {line}: the instructor comment header was edited")]
    BrokenHeader {
        /// 1-based line number
        line: usize,
    },
}

/// Where the parser is inside the rubric file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// `name: mark/max` lines.
    ReadingAttributes,
    /// Between the opening border and the closing border.
    ReadingCommentHeader {
        /// whether the title line has been passed
        seen_title: bool,
    },
    /// Everything after the closing border is grader text.
    ReadingComments,
}

/// Renders `rubric` in the exchange format.
pub fn render(rubric: &Rubric) -> String {
    let mut out = String::new();
    for c in rubric.criteria() {
        out.push_str(&format!("{}: {}/{}\n", c.name, c.mark, c.max));
    }
    out.push_str(COMMENT_BORDER);
    out.push('\n');
    out.push_str(COMMENT_TITLE);
    out.push('\n');
    out.push_str(COMMENT_BORDER);
    out.push('\n');
    out
}

/// Writes `rubric` to `path` in the exchange format.
pub fn write(path: &Path, rubric: &Rubric) -> Result<()> {
    std::fs::write(path, render(rubric))
        .with_context(|| format!("Could not write rubric file {}", path.display()))
}

/// Parses an edited rubric file into a finalized rubric for `student`.
///
/// Marks are taken as written. The maximum on the right of the `/` is not
/// checked against the template, so a grader may award bonus marks. Every
/// criterion of the template must still have its line.
pub fn parse(text: &str, template: &Rubric, student: &str) -> Result<Rubric, ExchangeError> {
    let mut rubric = Rubric::for_student(template, student);
    let mut state = ParseState::ReadingAttributes;
    let mut comments: Vec<&str> = Vec::new();
    let mut seen = vec![false; template.criteria().len()];

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');
        let trimmed = line.trim();

        state = match state {
            ParseState::ReadingAttributes => {
                if trimmed == COMMENT_BORDER {
                    ParseState::ReadingCommentHeader { seen_title: false }
                } else if trimmed.is_empty() || trimmed.starts_with('#') {
                    state
                } else {
                    let name = parse_criterion(line_no, line, &mut rubric)?;
                    if let Some(pos) = template.names().position(|n| n == name) {
                        seen[pos] = true;
                    }
                    state
                }
            }
            ParseState::ReadingCommentHeader { seen_title } => {
                if trimmed == COMMENT_BORDER && seen_title {
                    ParseState::ReadingComments
                } else if trimmed == COMMENT_TITLE && !seen_title {
                    ParseState::ReadingCommentHeader { seen_title: true }
                } else {
                    return Err(ExchangeError::BrokenHeader { line: line_no });
                }
            }
            ParseState::ReadingComments => {
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    comments.push(line);
                }
                state
            }
        };
    }

    if let Some((c, _)) = template.criteria().iter().zip(&seen).find(|(_, found)| !**found) {
        return Err(ExchangeError::MissingCriterion {
            name: c.name.clone(),
        });
    }

    rubric.set_comments(comments.join(" "));
    rubric.add_marks();
    Ok(rubric)
}

/// Reads and parses the rubric file at `path`.
pub fn read(path: &Path, template: &Rubric, student: &str) -> Result<Rubric> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read rubric file {}", path.display()))?;
    parse(&text, template, student)
        .with_context(|| format!("Could not parse rubric file {}", path.display()))
}

/// Applies a single `name: mark/max` line and returns the criterion name.
fn parse_criterion<'l>(
    line_no: usize,
    line: &'l str,
    rubric: &mut Rubric,
) -> Result<&'l str, ExchangeError> {
    let malformed = || ExchangeError::Malformed {
        line: line_no,
        text: line.to_string(),
    };

    let (name, values) = line.split_once(':').ok_or_else(malformed)?;
    let name = name.trim();
    let (mark, _max) = values.split_once('/').ok_or_else(malformed)?;
    let mark = mark.trim();

    let value = mark
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ExchangeError::InvalidMark {
            line:  line_no,
            name:  name.to_string(),
            value: mark.to_string(),
        })?;

    rubric.set_mark(name, value).map_err(|e| match e {
        RubricError::UnknownCriterion(name) => ExchangeError::UnknownCriterion {
            line: line_no,
            name,
        },
        _ => malformed(),
    })?;
    Ok(name)
}
