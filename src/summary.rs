#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fmt::Write as _,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{diff::DiffOutcome, runner::ToolOutput};

/// File name of the per-student summary inside the working directory.
pub const SUMMARY_FILE: &str = "summary.txt";

/// Border around each per-file section.
const SECTION_BORDER: &str = "#=========================================#";
/// Border around raw program output.
const OUTPUT_BORDER: &str = "#=============================#";

/// What happened when diffing a program's output.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffReport {
    /// Diffing is turned off; raw output is shown instead.
    Disabled,
    /// Diffing is on but no master output matches this file.
    Unavailable,
    /// The comparison result.
    Outcome(DiffOutcome),
}

/// Compile, run and diff results for one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    /// Name of the source file.
    pub file_name: String,
    /// Compiler result; `None` for languages without a compile step.
    pub compile:   Option<ToolOutput>,
    /// Program result; `None` when it was never run.
    pub run:       Option<ToolOutput>,
    /// Diff result.
    pub diff:      DiffReport,
}

impl FileReport {
    /// Whether compilation succeeded or was not needed.
    pub fn compiled(&self) -> bool {
        self.compile.as_ref().is_none_or(ToolOutput::success)
    }
}

/// Renders one section of the summary.
pub fn render(report: &FileReport) -> String {
    let mut out = String::new();
    let name = &report.file_name;

    let _ = writeln!(out, "{SECTION_BORDER}");
    let _ = writeln!(out, "# Summary for file {name}");
    let _ = writeln!(out, "{SECTION_BORDER}");

    match &report.compile {
        Some(c) if !c.success() => {
            let _ = writeln!(out, "Compilation error: return code {}", c.code_display());
            let _ = write!(out, "{}\n\n", c.stderr);
            let _ = write!(out, "{}\n\n", c.stdout);
            return out;
        }
        Some(_) => {
            let _ = writeln!(out, "Compilation successful");
        }
        None => {
            let _ = writeln!(out, "No compilation required");
        }
    }

    let Some(run) = &report.run else {
        let _ = writeln!(out, "Program was not run.\n");
        return out;
    };
    let _ = write!(out, "Program return code: {}\n\n", run.code_display());

    match (&report.diff, run.success()) {
        (DiffReport::Outcome(outcome), true) => render_diff(&mut out, outcome),
        (DiffReport::Unavailable, true) => out.push_str("Could not perform diff.\n\n"),
        _ => render_output(&mut out, name, run),
    }

    out
}

/// Renders a diff outcome.
fn render_diff(out: &mut String, outcome: &DiffOutcome) {
    match outcome {
        DiffOutcome::Match => out.push_str("Diff results: outputs are identical.\n\n"),
        DiffOutcome::NoOutput => {
            out.push_str("Diff results\n");
            out.push_str("Empty diff. No output received from program.\n\n");
        }
        DiffOutcome::Mismatch { lines } => {
            out.push_str("Diff results:\n");
            out.push_str("Legend:\n");
            out.push_str("-: expected\n");
            out.push_str("+: received\n");
            out.push_str("?: diff results\n\n");
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
    }
}

/// Renders raw stdout and stderr.
fn render_output(out: &mut String, name: &str, run: &ToolOutput) {
    let _ = writeln!(out, "# Output for {name}");
    let _ = writeln!(out, "{OUTPUT_BORDER}");
    let _ = write!(out, "stdout:\n{}\n\n", run.stdout);
    let _ = writeln!(out, "{OUTPUT_BORDER}");
    let _ = write!(out, "stderr:\n{}\n\n", run.stderr);
}

/// Appends sections to a student's summary file.
#[derive(Debug, Clone)]
pub struct SummaryWriter {
    /// path to the summary file
    path: PathBuf,
}

impl SummaryWriter {
    /// Summary kept in the working directory `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(SUMMARY_FILE),
        }
    }

    /// Location of the summary file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the section for one file.
    pub fn append(&self, report: &FileReport) -> Result<()> {
        self.append_text(&render(report))
    }

    /// Appends free text.
    pub fn append_text(&self, text: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Could not open summary {}", self.path.display()))?;
        file.write_all(text.as_bytes())
            .with_context(|| format!("Could not write summary {}", self.path.display()))
    }
}
