#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # marking
//!
//! Marks a directory of student submissions: compiles and runs each one,
//! diffs the output, and opens everything in an editor so a grader can fill
//! in the rubric. Interrupted batches resume from the incremental ledger.
//!
//! Run `marking init` to get a commented sample configuration, edit it, then
//! `marking mark path/to/config.toml`.

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use marking::{
    BatchProcessor, MarkingConfig,
    config::write_sample,
    report::{overview, purge_working_dir, write_comment_files, write_grades_csv},
    util::format_elapsed,
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Mark every submission described by a config file
    Mark {
        /// path to the config file
        config:  PathBuf,
        /// log per-student state transitions
        verbose: bool,
    },
    /// Write a sample config file
    Init(PathBuf),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the config path
    fn config() -> impl Parser<PathBuf> {
        positional("CONFIG").help("Path to the marking config file")
    }

    /// parses the verbosity switch
    fn verbose() -> impl Parser<bool> {
        short('v')
            .long("verbose")
            .help("Log every state change of every student")
            .switch()
    }

    /// parses where to write the sample
    fn target() -> impl Parser<PathBuf> {
        positional("PATH")
            .help("Where to write the sample config")
            .fallback(PathBuf::from("sample.toml"))
    }

    let verbose = verbose();
    let config = config();
    let mark = construct!(Cmd::Mark { verbose, config })
        .to_options()
        .command("mark")
        .help("Mark all submissions described by a config file");

    let init = construct!(Cmd::Init(target()))
        .to_options()
        .command("init")
        .help("Write a commented sample config file");

    let cmd = construct!([mark, init]);

    cmd.to_options()
        .descr("Semi-automated assignment marker")
        .run()
}

/// Installs the console logger.
fn init_tracing(verbose: bool) {
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_target(false);
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(fmt)
        .with(LevelFilter::from_level(level))
        .init();
}

/// Runs a whole batch and the post-batch outputs.
async fn mark(config_path: PathBuf) -> Result<()> {
    let config = MarkingConfig::load(&config_path)?;
    config.verify().context("Setup check failed, no submission was marked")?;

    let started = Instant::now();
    let report = BatchProcessor::with_processes(&config).run().await?;
    let elapsed = started.elapsed().as_secs();

    eprintln!("{}", overview(&report.table, config.rubric()));
    if !report.failures.is_empty() {
        eprintln!("{}", "Could not mark:".red().bold());
        for failure in &report.failures {
            eprintln!("  {} ({}): {}", failure.student.red(), failure.stage, failure.message);
        }
    }
    tracing::info!("Total grading time {}", format_elapsed(elapsed));

    if config.make_comments() {
        let written = write_comment_files(&report.table, config.root())?;
        tracing::info!("Wrote {written} comment file(s)");
    }
    if config.make_csv() {
        let path = write_grades_csv(&report.table, config.rubric(), config.root())?;
        tracing::info!("Wrote {}", path.display());
    }

    // The ledger is only thrown away once everything it holds is written out.
    if config.make_comments() && config.make_csv() && report.failures.is_empty() {
        purge_working_dir(config.working_dir())?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    match options() {
        Cmd::Mark { config, verbose } => {
            init_tracing(verbose);
            mark(config).await?;
        }
        Cmd::Init(path) => {
            init_tracing(false);
            write_sample(&path)?;
            tracing::info!("Wrote sample config to {}", path.display());
        }
    }

    Ok(())
}
