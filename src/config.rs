#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use serde::Deserialize;

use crate::{
    rubric::Rubric,
    util::{resolve_path, split_path_list, tool_path},
};

/// Commented configuration written by `marking init`.
pub const SAMPLE_CONFIG: &str = include_str!("templates/sample_config.toml");

/// Default name of the folder holding a student's files inside their
/// directory.
pub const DEFAULT_SUBMISSION_DIR: &str = "Submission attachment(s)";

/// Environment variable that overrides the configured editor command.
pub const EDITOR_ENV: &str = "MARKING_EDITOR";

/// How the runtime is told which program to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunTarget {
    /// The file name without extension, eg. `java Main`.
    Stem,
    /// The file name, eg. `python main.py`.
    File,
}

/// Languages with built-in tool presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// `javac` + `java`.
    Java,
    /// `python`, no compile step.
    Python,
}

/// Tools and file extensions used to build and run a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Extension of source files, with the leading dot.
    pub extension:           String,
    /// Extension of build byproducts removed after each student.
    pub generated_extension: Option<String>,
    /// Compiler executable; `None` for interpreted languages.
    pub compiler:            Option<String>,
    /// Runtime or interpreter executable.
    pub runtime:             String,
    /// Extra arguments passed to the program.
    pub run_args:            Vec<String>,
    /// How the program is named on the runtime's command line.
    pub run_target:          RunTarget,
}

impl Toolchain {
    /// Built-in defaults for `language`.
    pub fn preset(language: Language) -> Self {
        match language {
            Language::Java => Self {
                extension:           ".java".into(),
                generated_extension: Some(".class".into()),
                compiler:            Some("javac".into()),
                runtime:             "java".into(),
                run_args:            vec![],
                run_target:          RunTarget::Stem,
            },
            Language::Python => Self {
                extension:           ".py".into(),
                generated_extension: Some(".pyc".into()),
                compiler:            None,
                runtime:             "python".into(),
                run_args:            vec![],
                run_target:          RunTarget::File,
            },
        }
    }

    /// Whether `path` is a source file for this toolchain.
    pub fn is_source(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .is_some_and(|n| n.ends_with(&self.extension.to_lowercase()))
    }
}

/// `[config]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGeneral {
    /// directory holding one folder per student
    root:           PathBuf,
    /// scratch directory
    working:        PathBuf,
    /// fill in grades.csv after the batch
    #[serde(default)]
    make_csv:       bool,
    /// write comments.txt per student after the batch
    #[serde(default)]
    make_comments:  bool,
    /// folder inside each student directory holding the files
    submission_dir: Option<String>,
}

/// `[editor]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEditor {
    /// editor executable
    command: String,
    /// arguments placed before the file list
    #[serde(default)]
    args:    Vec<String>,
}

/// `[language]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLanguage {
    /// preset to start from
    name:                Language,
    /// overrides
    extension:           Option<String>,
    /// overrides
    generated_extension: Option<String>,
    /// overrides; an empty string disables compilation
    compiler:            Option<String>,
    /// overrides
    runtime:             Option<String>,
    /// overrides
    #[serde(default)]
    run_args:            Vec<String>,
    /// overrides
    run_target:          Option<RunTarget>,
}

/// `[io]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIo {
    /// `;`-separated stdin files
    #[serde(default)]
    input:  String,
    /// `;`-separated master output files
    #[serde(default)]
    output: String,
    /// whether to diff program output against the masters
    #[serde(default)]
    diff:   bool,
}

/// `[aux]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAux {
    /// `;`-separated files copied for every student
    #[serde(default)]
    files:         String,
    /// pre-processing script
    script:        Option<PathBuf>,
    /// interpreter for the script
    script_runner: Option<String>,
}

/// One `[[rubric]]` entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCriterion {
    /// criterion name
    name: String,
    /// maximum mark
    max:  f64,
}

/// The configuration file as written.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// general settings
    config:   RawGeneral,
    /// editor settings
    editor:   RawEditor,
    /// language settings
    language: RawLanguage,
    /// optional input/output settings
    #[serde(default)]
    io:       RawIo,
    /// optional auxiliary files
    #[serde(default)]
    aux:      RawAux,
    /// marking rubric, in order
    rubric:   Vec<RawCriterion>,
}

/// Validated, immutable marking configuration.
#[derive(Debug, Clone)]
pub struct MarkingConfig {
    /// Directory holding one folder per student.
    root:           PathBuf,
    /// Scratch directory where each student is staged.
    working_dir:    PathBuf,
    /// Fill in `grades.csv` after the batch.
    make_csv:       bool,
    /// Write `comments.txt` per student after the batch.
    make_comments:  bool,
    /// Folder inside each student directory holding the files.
    submission_dir: String,
    /// Editor executable.
    editor:         String,
    /// Editor arguments placed before the file list.
    editor_args:    Vec<String>,
    /// Build and run tools.
    toolchain:      Toolchain,
    /// Files fed to programs on stdin, matched by stem.
    input_files:    Vec<PathBuf>,
    /// Master outputs, matched by stem.
    output_files:   Vec<PathBuf>,
    /// Whether to diff program output against the masters.
    diff:           bool,
    /// Files copied for every student.
    aux_files:      Vec<PathBuf>,
    /// Script run before each student's programs.
    script:         Option<PathBuf>,
    /// Interpreter for the script.
    script_runner:  String,
    /// Master rubric.
    rubric:         Rubric,
}

impl MarkingConfig {
    /// Reads and validates the configuration at `path`. Relative paths are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        let base = path
            .canonicalize()
            .with_context(|| format!("Could not resolve {}", path.display()))?
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_toml_str(&text, &base)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parses and validates configuration text, resolving relative paths
    /// against `base`.
    pub fn from_toml_str(text: &str, base: &Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text).context("Could not parse configuration")?;

        let rubric = Rubric::template(raw.rubric.into_iter().map(|c| (c.name, c.max)))
            .context("Invalid [[rubric]] entries")?;

        let mut toolchain = Toolchain::preset(raw.language.name);
        if let Some(ext) = raw.language.extension {
            toolchain.extension = ext;
        }
        if let Some(ext) = raw.language.generated_extension {
            toolchain.generated_extension = Some(ext).filter(|e| !e.trim().is_empty());
        }
        if let Some(compiler) = raw.language.compiler {
            toolchain.compiler = Some(compiler).filter(|c| !c.trim().is_empty());
        }
        if let Some(runtime) = raw.language.runtime {
            toolchain.runtime = runtime;
        }
        if let Some(target) = raw.language.run_target {
            toolchain.run_target = target;
        }
        toolchain.run_args = raw.language.run_args;

        ensure!(
            toolchain.extension.starts_with('.') && toolchain.extension.len() > 1,
            "[language] extension must look like `.java`, got `{}`",
            toolchain.extension
        );
        if let Some(ext) = &toolchain.generated_extension {
            ensure!(
                ext.starts_with('.') && ext.len() > 1,
                "[language] generated_extension must look like `.class`, got `{ext}`"
            );
            ensure!(
                !ext.eq_ignore_ascii_case(&toolchain.extension),
                "[language] generated_extension must differ from extension"
            );
        }
        ensure!(!toolchain.runtime.trim().is_empty(), "[language] runtime is empty");

        let editor = std::env::var(EDITOR_ENV)
            .ok()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or(raw.editor.command);
        ensure!(!editor.trim().is_empty(), "[editor] command is empty");

        let output_files = split_path_list(base, &raw.io.output);
        if raw.io.diff && output_files.is_empty() {
            bail!("[io] diff is enabled but no output files are listed");
        }

        let submission_dir = raw
            .config
            .submission_dir
            .unwrap_or_else(|| DEFAULT_SUBMISSION_DIR.to_string());
        ensure!(
            !submission_dir.trim().is_empty(),
            "[config] submission_dir is empty"
        );

        Ok(Self {
            root: resolve_path(base, raw.config.root),
            working_dir: resolve_path(base, raw.config.working),
            make_csv: raw.config.make_csv,
            make_comments: raw.config.make_comments,
            submission_dir,
            editor,
            editor_args: raw.editor.args,
            toolchain,
            input_files: split_path_list(base, &raw.io.input),
            output_files,
            diff: raw.io.diff,
            aux_files: split_path_list(base, &raw.aux.files),
            script: raw.aux.script.map(|s| resolve_path(base, s)),
            script_runner: raw.aux.script_runner.unwrap_or_else(|| "python".to_string()),
            rubric,
        })
    }

    /// Checks that every configured executable and shared file exists, so a
    /// batch never starts with a setup problem.
    pub fn verify(&self) -> Result<()> {
        let mut tools = vec![self.toolchain.runtime.as_str(), self.editor.as_str()];
        if let Some(compiler) = &self.toolchain.compiler {
            tools.push(compiler);
        }
        if self.script.is_some() {
            tools.push(&self.script_runner);
        }
        for tool in tools {
            tool_path(tool)?;
        }

        ensure!(
            self.root.is_dir(),
            "Root directory {} does not exist",
            self.root.display()
        );

        for file in self
            .input_files
            .iter()
            .chain(&self.output_files)
            .chain(&self.aux_files)
            .chain(self.script.iter())
        {
            ensure!(file.is_file(), "Configured file {} does not exist", file.display());
        }

        Ok(())
    }

    /// Directory holding one folder per student.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scratch directory where each student is staged.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Whether to fill in `grades.csv` after the batch.
    pub fn make_csv(&self) -> bool {
        self.make_csv
    }

    /// Whether to write `comments.txt` per student after the batch.
    pub fn make_comments(&self) -> bool {
        self.make_comments
    }

    /// Folder inside each student directory holding the files.
    pub fn submission_dir(&self) -> &str {
        &self.submission_dir
    }

    /// Editor executable.
    pub fn editor(&self) -> &str {
        &self.editor
    }

    /// Editor arguments.
    pub fn editor_args(&self) -> &[String] {
        &self.editor_args
    }

    /// Build and run tools.
    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Files fed to programs on stdin.
    pub fn input_files(&self) -> &[PathBuf] {
        &self.input_files
    }

    /// Master outputs.
    pub fn output_files(&self) -> &[PathBuf] {
        &self.output_files
    }

    /// Whether diffing is enabled.
    pub fn diff(&self) -> bool {
        self.diff
    }

    /// Pre-processing script.
    pub fn script(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    /// Interpreter for the pre-processing script.
    pub fn script_runner(&self) -> &str {
        &self.script_runner
    }

    /// Master rubric.
    pub fn rubric(&self) -> &Rubric {
        &self.rubric
    }

    /// Every shared file copied into the working directory per student.
    pub fn shared_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.input_files
            .iter()
            .chain(&self.output_files)
            .chain(&self.aux_files)
            .chain(self.script.iter())
    }
}

/// Writes [`SAMPLE_CONFIG`] to `path`, refusing to overwrite.
pub fn write_sample(path: &Path) -> Result<()> {
    ensure!(!path.exists(), "{} already exists", path.display());
    std::fs::write(path, SAMPLE_CONFIG)
        .with_context(|| format!("Could not write {}", path.display()))
}
