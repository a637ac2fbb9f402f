#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};

use crate::util::{find_files, remove_if_exists};

/// A student's folder under the batch root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDir {
    /// Directory name, used as the student identifier.
    pub name: String,
    /// Full path of the directory.
    pub path: PathBuf,
}

/// Lists student directories under `root`, sorted by name.
///
/// A resumed batch skips the students already named in the ledger and marks
/// the rest in this order. Plain files in the root (eg. the LMS
/// `grades.csv`) are ignored.
pub fn discover_students(root: &Path) -> Result<Vec<StudentDir>> {
    let mut students = Vec::new();
    for entry in std::fs::read_dir(root)
        .with_context(|| format!("Could not list student directories in {}", root.display()))?
    {
        let entry = entry.with_context(|| format!("Could not read entry in {}", root.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        students.push(StudentDir {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }

    students.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(students)
}

/// The files one student handed in.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Folder holding the files.
    pub dir:   PathBuf,
    /// Files in the folder, sorted by name.
    pub files: Vec<PathBuf>,
}

impl Submission {
    /// Finds the submission folder `subdir` inside `student`'s directory.
    pub fn locate(student: &StudentDir, subdir: &str) -> Result<Self> {
        let dir = student.path.join(subdir);
        ensure!(
            dir.is_dir(),
            "Submission folder {} does not exist",
            dir.display()
        );

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("Could not list submission {}", dir.display()))?
        {
            let path = entry
                .with_context(|| format!("Could not read entry in {}", dir.display()))?
                .path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        Ok(Self { dir, files })
    }
}

/// Tracks what was copied into the working directory for one student so it
/// can all be removed again.
#[derive(Debug)]
pub struct Staging {
    /// shared scratch directory
    working_dir: PathBuf,
    /// destinations of every copied file
    copied:      Vec<PathBuf>,
    /// transient files written during grading (summary, rubric)
    transient:   Vec<PathBuf>,
}

impl Staging {
    /// Starts staging into `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            copied:      Vec::new(),
            transient:   Vec::new(),
        }
    }

    /// Copies `src` into the working directory and returns the destination.
    pub fn copy_in(&mut self, src: &Path) -> Result<PathBuf> {
        let name = src
            .file_name()
            .with_context(|| format!("{} has no file name", src.display()))?;
        let dest = self.working_dir.join(name);
        std::fs::copy(src, &dest).with_context(|| {
            format!("Could not copy {} to {}", src.display(), dest.display())
        })?;
        self.copied.push(dest.clone());
        Ok(dest)
    }

    /// Registers a file created in the working directory that must be
    /// removed with the rest.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.transient.push(path.into());
    }

    /// Removes every tracked file, and every file ending in
    /// `generated_extension`, from the working directory.
    ///
    /// Best effort: missing files are fine, other failures are logged.
    pub fn cleanup(self, generated_extension: Option<&str>) {
        let mut targets = self.transient;
        targets.extend(self.copied);

        if let Some(ext) = generated_extension {
            match find_files(ext, 0, &self.working_dir) {
                Ok(found) => targets.extend(found),
                Err(e) => tracing::warn!("Could not look for {ext} files: {e:#}"),
            }
        }

        for path in targets {
            if let Err(e) = remove_if_exists(&path) {
                tracing::warn!("{e:#}");
            }
        }
    }
}
