//! # marking
//!
//! A semi-automated assignment marker. For every student directory it copies
//! the submission into a scratch directory, compiles and runs it, diffs the
//! output against a master, opens everything in an editor for a human grader,
//! reads the annotated rubric back and keeps an incremental CSV ledger so an
//! interrupted batch picks up where it left off.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// The per-student marking loop
pub mod batch;
/// Loading and validating the marking configuration
pub mod config;
/// Line diffs between master and student output
pub mod diff;
/// The hand-edited rubric text file
pub mod exchange;
/// The incremental grade ledger
pub mod ledger;
/// Spawning compilers, programs and editors
pub mod process;
/// Final grade sheet, comment files and console overview
pub mod report;
/// Rubrics and the grade table
pub mod rubric;
/// Compiler/runtime and reviewer collaborators
pub mod runner;
/// Student directory discovery and working-directory staging
pub mod submission;
/// Per-student compile/run/diff summaries
pub mod summary;
/// Utility functions for convenience
pub mod util;

pub use batch::{BatchProcessor, BatchReport, StudentFailure, StudentState};
pub use config::MarkingConfig;
pub use rubric::{Criterion, GradeTable, Rubric};
