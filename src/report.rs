#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tabled::{
    builder::Builder,
    settings::{Panel, Style},
};

use crate::{
    ledger,
    rubric::{GradeTable, Rubric},
    submission::discover_students,
    util::remove_if_exists,
};

/// Name of the grade sheet in the batch root.
pub const GRADES_FILE: &str = "grades.csv";

/// Name of the per-student feedback file.
pub const COMMENTS_FILE: &str = "comments.txt";

/// Rows at the top of an LMS grade export that are not students.
const LMS_HEADER_ROWS: usize = 3;

/// Border used in the comments file.
const COMMENTS_BORDER: &str = "#=============================#";

/// Fills in the grade sheet at `<root>/grades.csv`.
///
/// If the LMS export is already there, every student row gets its last
/// column set to the total of the student whose directory is named
/// `"<last>, <first>(<id>)"`. Rows with no matching rubric are left alone.
/// Otherwise a new sheet with the ledger layout is written.
pub fn write_grades_csv(table: &GradeTable, master: &Rubric, root: &Path) -> Result<PathBuf> {
    let path = root.join(GRADES_FILE);

    let rows: Vec<Vec<String>> = if path.is_file() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Could not open {}", path.display()))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.with_context(|| format!("Could not read {}", path.display()))?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let mut filled = 0usize;
        for row in rows.iter_mut().skip(LMS_HEADER_ROWS) {
            let [_, id, last, first, ..] = row.as_slice() else {
                continue;
            };
            let name = format!("{last}, {first}({id})");
            if let Some(rubric) = table.find(&name)
                && let Some(cell) = row.last_mut()
            {
                *cell = rubric.total().to_string();
                filled += 1;
            }
        }
        tracing::info!("Filled in {} total(s) in {}", filled, path.display());
        rows
    } else {
        std::iter::once(ledger::header(master))
            .chain(table.iter().map(ledger::row))
            .collect()
    };

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(&path)
        .with_context(|| format!("Could not write {}", path.display()))?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(path)
}

/// Renders the feedback file for one student.
pub fn render_comments(rubric: &Rubric) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<pre>{COMMENTS_BORDER}");
    let _ = writeln!(out, "# Instructor's comments");
    let _ = writeln!(out, "{COMMENTS_BORDER}");
    for c in rubric.criteria() {
        let _ = writeln!(out, "{}: {}/{}", c.name, c.mark, c.max);
    }
    let _ = writeln!(out, "Total: {}", rubric.total());
    let _ = write!(out, "Comments:\n{}", rubric.comments());
    out
}

/// Writes `comments.txt` into the directory of every student in `table`.
///
/// Students without a rubric (nothing submitted, or errored) are skipped.
/// Returns how many files were written.
pub fn write_comment_files(table: &GradeTable, root: &Path) -> Result<usize> {
    let mut written = 0;
    for student in discover_students(root)? {
        let Some(rubric) = table.find(&student.name) else {
            continue;
        };
        let path = student.path.join(COMMENTS_FILE);
        std::fs::write(&path, render_comments(rubric))
            .with_context(|| format!("Could not write {}", path.display()))?;
        written += 1;
    }
    Ok(written)
}

/// Removes every plain file left in the working directory, ledger included.
pub fn purge_working_dir(working_dir: &Path) -> Result<()> {
    for entry in std::fs::read_dir(working_dir)
        .with_context(|| format!("Could not list {}", working_dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            remove_if_exists(&path)?;
        }
    }
    Ok(())
}

/// Console overview of the marked students.
pub fn overview(table: &GradeTable, master: &Rubric) -> String {
    let mut builder = Builder::default();
    let mut head = vec!["Student".to_string()];
    head.extend(master.criteria().iter().map(|c| format!("{} (/{})", c.name, c.max)));
    head.push(format!("Total (/{})", master.out_of()));
    builder.push_record(head);

    for rubric in table {
        let mut record = vec![rubric.student().to_string()];
        record.extend(rubric.criteria().iter().map(|c| c.mark.to_string()));
        record.push(rubric.total().to_string());
        builder.push_record(record);
    }

    let mut out = builder.build();
    out.with(Panel::header("Marking Overview"))
        .with(Style::modern());
    out.to_string()
}
