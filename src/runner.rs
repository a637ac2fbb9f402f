#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{
    config::{RunTarget, Toolchain},
    process::{StdinSource, decode_output, run_collect, run_interactive},
};

/// Exit code and decoded output of a compiler or program run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code:   Option<i32>,
    /// Decoded stdout.
    pub stdout: String,
    /// Decoded stderr.
    pub stderr: String,
}

impl ToolOutput {
    /// Creates an output with the given exit code.
    pub fn new(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code:   Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with code zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code for display.
    pub fn code_display(&self) -> String {
        self.code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "none (terminated by signal)".to_string())
    }
}

impl From<crate::process::Collected> for ToolOutput {
    fn from(c: crate::process::Collected) -> Self {
        Self {
            code:   c.status.code(),
            stdout: decode_output(&c.stdout),
            stderr: decode_output(&c.stderr),
        }
    }
}

/// Compiles and runs submission files.
///
/// An `Err` means the tool itself could not be invoked; a tool that ran and
/// failed is an `Ok` with a non-zero code.
#[allow(async_fn_in_trait)]
pub trait Runner {
    /// Compiles `source` inside `cwd`. Returns `None` when the language has
    /// no compile step.
    async fn compile(&self, source: &Path, cwd: &Path) -> Result<Option<ToolOutput>>;

    /// Runs the program built from `source`, feeding `stdin` if given.
    async fn run(&self, source: &Path, stdin: Option<Vec<u8>>, cwd: &Path) -> Result<ToolOutput>;

    /// Runs a pre-processing script inside `cwd` and waits for it.
    async fn preprocess(&self, script: &Path, cwd: &Path) -> Result<()>;
}

/// Hands files to the human grader and blocks until they are done.
///
/// Before the call the files exist in the working directory; after it the
/// rubric file holds the grader's marks.
#[allow(async_fn_in_trait)]
pub trait Reviewer {
    /// Opens `files` for editing inside `cwd` and waits for the grader.
    async fn review(&self, files: &[PathBuf], cwd: &Path) -> Result<()>;
}

/// [`Runner`] backed by real compiler and runtime processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    /// language tools
    toolchain:     Toolchain,
    /// interpreter used for the pre-processing script
    script_runner: String,
}

impl ProcessRunner {
    /// Creates a runner for `toolchain`.
    pub fn new(toolchain: Toolchain, script_runner: impl Into<String>) -> Self {
        Self {
            toolchain,
            script_runner: script_runner.into(),
        }
    }
}

/// File name of `path` as an argument.
fn file_arg(path: &Path) -> Result<OsString> {
    path.file_name()
        .map(OsString::from)
        .with_context(|| format!("{} has no file name", path.display()))
}

impl Runner for ProcessRunner {
    async fn compile(&self, source: &Path, cwd: &Path) -> Result<Option<ToolOutput>> {
        let Some(compiler) = self.toolchain.compiler.as_deref() else {
            return Ok(None);
        };
        tracing::debug!("Compiling {} with {}", source.display(), compiler);

        let collected = run_collect(compiler, &[file_arg(source)?], StdinSource::Null, Some(cwd))
            .await
            .with_context(|| format!("Could not compile {}", source.display()))?;
        Ok(Some(collected.into()))
    }

    async fn run(&self, source: &Path, stdin: Option<Vec<u8>>, cwd: &Path) -> Result<ToolOutput> {
        let target = match self.toolchain.run_target {
            RunTarget::Stem => OsString::from(crate::util::stem(source)),
            RunTarget::File => file_arg(source)?,
        };
        let mut args = vec![target];
        args.extend(self.toolchain.run_args.iter().map(OsString::from));

        tracing::debug!("Running {} with {}", source.display(), self.toolchain.runtime);
        let stdin = match stdin {
            Some(bytes) => StdinSource::Bytes(bytes),
            None => StdinSource::Null,
        };

        let collected = run_collect(&self.toolchain.runtime, &args, stdin, Some(cwd))
            .await
            .with_context(|| format!("Could not run {}", source.display()))?;
        Ok(collected.into())
    }

    async fn preprocess(&self, script: &Path, cwd: &Path) -> Result<()> {
        tracing::info!("Running pre-processing script {}", script.display());
        let status = run_interactive(&self.script_runner, &[script.as_os_str().to_owned()], Some(cwd))
            .await
            .with_context(|| format!("Could not run pre-processing script {}", script.display()))?;
        if !status.success() {
            tracing::warn!("Pre-processing script {} exited with {}", script.display(), status);
        }
        Ok(())
    }
}

/// [`Reviewer`] that opens an external text editor.
#[derive(Debug, Clone)]
pub struct Editor {
    /// editor executable
    command: String,
    /// arguments placed before the file list
    args:    Vec<String>,
}

impl Editor {
    /// Creates an editor invocation.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

impl Reviewer for Editor {
    async fn review(&self, files: &[PathBuf], cwd: &Path) -> Result<()> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        args.extend(files.iter().map(|f| f.as_os_str().to_owned()));

        let status = run_interactive(&self.command, &args, Some(cwd))
            .await
            .with_context(|| format!("Could not open editor `{}`", self.command))?;
        if !status.success() {
            tracing::warn!("Editor `{}` exited with {}", self.command, status);
        }
        Ok(())
    }
}
