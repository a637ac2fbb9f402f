use marking::{
    diff::DiffOutcome,
    runner::ToolOutput,
    summary::{DiffReport, FileReport, SummaryWriter, render},
};

fn ran(stdout: &str, diff: DiffReport) -> FileReport {
    FileReport {
        file_name: "Main.java".into(),
        compile: Some(ToolOutput::new(0, "", "")),
        run: Some(ToolOutput::new(0, stdout, "")),
        diff,
    }
}

#[test]
fn disabled_diff_shows_raw_output() {
    let text = render(&ran("42\n", DiffReport::Disabled));
    assert!(text.contains("Program return code: 0"));
    assert!(text.contains("# Output for Main.java"));
    assert!(text.contains("stdout:\n42\n"));
}

#[test]
fn empty_output_is_called_out() {
    let text = render(&ran("", DiffReport::Outcome(DiffOutcome::NoOutput)));
    assert!(text.contains("Empty diff. No output received from program."));
}

#[test]
fn missing_master_is_reported() {
    let text = render(&ran("42\n", DiffReport::Unavailable));
    assert!(text.contains("Could not perform diff."));
}

#[test]
fn crashed_program_shows_stderr_instead_of_diff() {
    let report = FileReport {
        run: Some(ToolOutput::new(1, "", "Exception in thread \"main\"")),
        ..ran("", DiffReport::Unavailable)
    };
    let text = render(&report);
    assert!(text.contains("Program return code: 1"));
    assert!(text.contains("Exception in thread"));
    assert!(!text.contains("Could not perform diff."));
}

#[test]
fn interpreted_languages_skip_compilation() {
    let report = FileReport {
        compile: None,
        ..ran("ok\n", DiffReport::Outcome(DiffOutcome::Match))
    };
    assert!(report.compiled());
    let text = render(&report);
    assert!(text.contains("No compilation required"));
    assert!(text.contains("outputs are identical"));
}

#[test]
fn writer_appends_sections() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = SummaryWriter::in_dir(dir.path());

    writer.append(&ran("a\n", DiffReport::Disabled)).expect("first");
    writer.append(&ran("b\n", DiffReport::Disabled)).expect("second");

    let text = std::fs::read_to_string(writer.path()).expect("read summary");
    assert_eq!(text.matches("# Summary for file Main.java").count(), 2);
}
