#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The incremental `grades_inc.csv` ledger: one row per recorded student,
//! rewritten after every student so an interrupted batch can resume.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail, ensure};

use crate::rubric::{GradeTable, Rubric};

/// File name of the incremental ledger inside the working directory.
pub const LEDGER_FILE: &str = "grades_inc.csv";

/// First column of the ledger.
const STUDENT_COLUMN: &str = "Student";
/// Second to last column of the ledger.
const TOTAL_COLUMN: &str = "Total";
/// Last column of the ledger.
const COMMENTS_COLUMN: &str = "Comments";

/// The on-disk record of every student graded so far.
///
/// Each flush rewrites the whole file through a temporary sibling that is
/// then renamed over the ledger, so readers see either the previous or the
/// new table, never a partial one.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// path to the CSV file
    path: PathBuf,
}

/// Header row for `master`.
pub fn header(master: &Rubric) -> Vec<String> {
    std::iter::once(STUDENT_COLUMN.to_string())
        .chain(master.names().map(str::to_string))
        .chain([TOTAL_COLUMN.to_string(), COMMENTS_COLUMN.to_string()])
        .collect()
}

/// One CSV row for a finalized rubric.
pub fn row(rubric: &Rubric) -> Vec<String> {
    std::iter::once(rubric.student().to_string())
        .chain(rubric.criteria().iter().map(|c| c.mark.to_string()))
        .chain([rubric.total().to_string(), rubric.comments().to_string()])
        .collect()
}

impl Ledger {
    /// A ledger stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The ledger kept in the working directory `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(LEDGER_FILE))
    }

    /// Location of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a previous run left a ledger behind.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Serializes `table` and atomically replaces the ledger file with it.
    pub fn flush(&self, table: &GradeTable, master: &Rubric) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Could not create a temporary ledger in {}", dir.display()))?;

        {
            let mut writer = csv::WriterBuilder::new()
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(tmp.as_file_mut());
            writer
                .write_record(header(master))
                .context("Could not write ledger header")?;
            for rubric in table {
                writer
                    .write_record(row(rubric))
                    .with_context(|| format!("Could not write ledger row for {}", rubric.student()))?;
            }
            writer.flush().context("Could not flush ledger")?;
        }
        tmp.as_file_mut().flush()?;
        if let Err(e) = tmp.as_file().sync_all() {
            tracing::warn!("Could not sync ledger to disk: {e}");
        }

        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Could not replace ledger {}", self.path.display()))?;
        Ok(())
    }

    /// Restores the table recorded in the ledger.
    ///
    /// The number of rows returned is the number of leading students a
    /// resumed batch skips.
    pub fn load(&self, master: &Rubric) -> Result<GradeTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Could not open ledger {}", self.path.display()))?;

        let columns: Vec<String> = reader
            .headers()
            .with_context(|| format!("Could not read ledger header in {}", self.path.display()))?
            .iter()
            .map(str::to_string)
            .collect();
        ensure!(
            columns == header(master),
            "Ledger {} has columns {:?}, which do not match the configured rubric {:?}",
            self.path.display(),
            columns,
            header(master)
        );

        let n = columns.len();
        let mut table = GradeTable::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Could not read ledger row {}", idx + 1))?;
            if record.len() != n {
                bail!(
                    "Ledger row {} has {} fields, expected {}",
                    idx + 1,
                    record.len(),
                    n
                );
            }

            let mut rubric = Rubric::for_student(master, &record[0]);
            for (col, name) in columns.iter().enumerate().take(n - 2).skip(1) {
                let mark = parse_number(&record[col])
                    .with_context(|| format!("Ledger row {}, column `{}`", idx + 1, name))?;
                rubric.set_mark(name, mark)?;
            }
            rubric.set_total(
                parse_number(&record[n - 2])
                    .with_context(|| format!("Ledger row {}, column `{TOTAL_COLUMN}`", idx + 1))?,
            );
            rubric.set_comments(&record[n - 1]);
            table.push(rubric);
        }

        Ok(table)
    }

    /// Loads the ledger if one exists, otherwise starts an empty table.
    pub fn load_or_default(&self, master: &Rubric) -> Result<GradeTable> {
        if self.exists() {
            self.load(master)
        } else {
            Ok(GradeTable::new())
        }
    }
}

/// Parses a mark written by [`row`].
fn parse_number(cell: &str) -> Result<f64> {
    cell.trim()
        .parse::<f64>()
        .with_context(|| format!("`{cell}` is not a number"))
}
