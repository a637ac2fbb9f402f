#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Drives every student through compile, run, diff, human review and
//! recording, one at a time.
//!
//! Per student the states are
//! `Pending -> Preparing -> Executed -> AwaitingReview -> Reviewed -> Recorded`,
//! with `Errored` reachable from any state before `Recorded`. An errored
//! student is logged, left out of the table and retried on the next run; the
//! batch carries on with the next directory.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{
    config::MarkingConfig,
    diff::{diff_lines, split_lines},
    exchange::{self, RUBRIC_FILE},
    ledger::Ledger,
    rubric::{GradeTable, Rubric},
    runner::{Editor, ProcessRunner, Reviewer, Runner},
    submission::{Staging, StudentDir, Submission, discover_students},
    summary::{DiffReport, FileReport, SummaryWriter},
    util::find_by_stem,
};

/// Where a student is in the marking pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentState {
    /// Not started.
    Pending,
    /// Files are being copied and the pre-processing script run.
    Preparing,
    /// Every source file has been compiled, run and diffed.
    Executed,
    /// The grader has the files open.
    AwaitingReview,
    /// The edited rubric has been parsed and totalled.
    Reviewed,
    /// The rubric is in the table and the ledger.
    Recorded,
    /// Something went wrong; the student is not recorded.
    Errored,
}

impl Display for StudentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StudentState::Pending => "pending",
            StudentState::Preparing => "preparing",
            StudentState::Executed => "executed",
            StudentState::AwaitingReview => "awaiting review",
            StudentState::Reviewed => "reviewed",
            StudentState::Recorded => "recorded",
            StudentState::Errored => "errored",
        };
        f.write_str(s)
    }
}

/// A student that could not be marked in this run.
#[derive(Debug, Clone)]
pub struct StudentFailure {
    /// Student directory name.
    pub student: String,
    /// Student directory.
    pub path:    PathBuf,
    /// Last state reached before the failure.
    pub stage:   StudentState,
    /// Error chain.
    pub message: String,
}

/// Outcome of a batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Every recorded rubric, including those restored from the ledger.
    pub table:    GradeTable,
    /// Number of students restored from the ledger and skipped.
    pub resumed:  usize,
    /// Students that errored in this run.
    pub failures: Vec<StudentFailure>,
}

/// The per-student loop.
pub struct BatchProcessor<'a, R, V> {
    /// immutable run configuration
    config:   &'a MarkingConfig,
    /// compiles and runs programs
    runner:   R,
    /// hands files to the grader
    reviewer: V,
    /// incremental record of finished students
    ledger:   Ledger,
}

impl<'a> BatchProcessor<'a, ProcessRunner, Editor> {
    /// A processor using the configured compiler, runtime and editor.
    pub fn with_processes(config: &'a MarkingConfig) -> Self {
        let runner = ProcessRunner::new(config.toolchain().clone(), config.script_runner());
        let editor = Editor::new(config.editor(), config.editor_args().to_vec());
        Self::new(config, runner, editor)
    }
}

/// Moves `state` to `next`, logging the transition.
fn advance(state: &mut StudentState, next: StudentState, student: &str) {
    tracing::debug!("{student}: {state} -> {next}");
    *state = next;
}

impl<'a, R: Runner, V: Reviewer> BatchProcessor<'a, R, V> {
    /// A processor with custom collaborators. The ledger lives in the
    /// configured working directory.
    pub fn new(config: &'a MarkingConfig, runner: R, reviewer: V) -> Self {
        Self {
            config,
            runner,
            reviewer,
            ledger: Ledger::in_dir(config.working_dir()),
        }
    }

    /// Marks every student under the configured root that the ledger does
    /// not already hold.
    ///
    /// Errors only for problems that affect the whole batch: an unreadable or
    /// mismatched ledger, an unlistable root, or a ledger that cannot be
    /// written.
    pub async fn run(&self) -> Result<BatchReport> {
        let working_dir = self.config.working_dir();
        std::fs::create_dir_all(working_dir).with_context(|| {
            format!("Could not create working directory {}", working_dir.display())
        })?;

        let master = self.config.rubric();
        let mut table = self.ledger.load_or_default(master)?;
        let resumed = table.len();
        let students = discover_students(self.config.root())?;

        if resumed > 0 {
            tracing::info!(
                "Resuming from {}: {} student(s) already marked",
                self.ledger.path().display(),
                resumed
            );
        }
        if resumed > students.len() {
            tracing::warn!(
                "The ledger holds {} rows but only {} student directories exist",
                resumed,
                students.len()
            );
        }

        let total = students.len();
        let mut failures = Vec::new();

        // Without errors in an earlier run the recorded students are exactly
        // the leading `resumed` directories; matching by name also keeps an
        // errored student from shifting the rest.
        for (idx, student) in students.iter().enumerate() {
            if table.find(&student.name).is_some() {
                tracing::debug!("{}: already in the ledger", student.name);
                continue;
            }
            tracing::info!("[{}/{}] Marking {}", idx + 1, total, student.name);

            let mut staging = Staging::new(working_dir);
            let mut state = StudentState::Pending;
            let outcome = self.grade(student, &mut staging, &mut state).await;

            let flushed = match outcome {
                Ok(rubric) => {
                    tracing::info!("{rubric}");
                    table.push(rubric);
                    let flushed = self.ledger.flush(&table, master);
                    if flushed.is_ok() {
                        advance(&mut state, StudentState::Recorded, &student.name);
                    }
                    flushed
                }
                Err(e) => {
                    tracing::error!("Error in entry {} ({}) while {}", idx, student.name, state);
                    tracing::error!("Path: {}", student.path.display());
                    tracing::error!("{e:?}");
                    failures.push(StudentFailure {
                        student: student.name.clone(),
                        path:    student.path.clone(),
                        stage:   state,
                        message: format!("{e:#}"),
                    });
                    advance(&mut state, StudentState::Errored, &student.name);
                    self.ledger.flush(&table, master)
                }
            };

            staging.cleanup(self.config.toolchain().generated_extension.as_deref());
            flushed?;
        }

        Ok(BatchReport {
            table,
            resumed,
            failures,
        })
    }

    /// Takes one student from `Pending` to `Reviewed`.
    async fn grade(
        &self,
        student: &StudentDir,
        staging: &mut Staging,
        state: &mut StudentState,
    ) -> Result<Rubric> {
        let working_dir = self.config.working_dir();
        let toolchain = self.config.toolchain();

        advance(state, StudentState::Preparing, &student.name);
        let submission = Submission::locate(student, self.config.submission_dir())?;

        for shared in self.config.shared_files() {
            staging.copy_in(shared)?;
        }

        let mut sources = Vec::new();
        for file in &submission.files {
            let staged = staging.copy_in(file)?;
            if toolchain.is_source(&staged) {
                sources.push(staged);
            }
        }

        if let Some(script) = self.config.script() {
            let staged = match script.file_name() {
                Some(name) => working_dir.join(name),
                None => script.to_path_buf(),
            };
            self.runner.preprocess(&staged, working_dir).await?;
        }

        let summary = SummaryWriter::in_dir(working_dir);
        staging.track(summary.path());
        if sources.is_empty() {
            summary.append_text(&format!(
                "No {} files found in {}\n",
                toolchain.extension,
                submission.dir.display()
            ))?;
        }
        for source in &sources {
            let report = self.execute(source, working_dir).await?;
            summary.append(&report)?;
        }
        advance(state, StudentState::Executed, &student.name);

        let rubric_path = working_dir.join(RUBRIC_FILE);
        staging.track(&rubric_path);
        exchange::write(&rubric_path, &Rubric::for_student(self.config.rubric(), &student.name))?;

        let mut files = sources;
        files.push(summary.path().to_path_buf());
        files.push(rubric_path.clone());

        advance(state, StudentState::AwaitingReview, &student.name);
        self.reviewer.review(&files, working_dir).await?;

        let rubric = exchange::read(&rubric_path, self.config.rubric(), &student.name)?;
        advance(state, StudentState::Reviewed, &student.name);
        Ok(rubric)
    }

    /// Compiles, runs and diffs one staged source file.
    async fn execute(&self, source: &Path, working_dir: &Path) -> Result<FileReport> {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let compile = self.runner.compile(source, working_dir).await?;
        let mut report = FileReport {
            file_name,
            compile,
            run: None,
            diff: if self.config.diff() {
                DiffReport::Unavailable
            } else {
                DiffReport::Disabled
            },
        };
        if !report.compiled() {
            return Ok(report);
        }

        let stdin = match find_by_stem(self.config.input_files(), source) {
            Some(input) => Some(
                tokio::fs::read(input)
                    .await
                    .with_context(|| format!("Could not read input file {}", input.display()))?,
            ),
            None => None,
        };

        let run = self.runner.run(source, stdin, working_dir).await?;

        if self.config.diff()
            && run.success()
            && let Some(master) = find_by_stem(self.config.output_files(), source)
        {
            let expected = tokio::fs::read_to_string(master)
                .await
                .with_context(|| format!("Could not read master output {}", master.display()))?;
            report.diff = DiffReport::Outcome(diff_lines(
                &split_lines(&expected),
                &split_lines(&run.stdout),
            ));
        }

        report.run = Some(run);
        Ok(report)
    }
}
