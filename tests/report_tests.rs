use marking::{
    ledger::LEDGER_FILE,
    report::{
        COMMENTS_FILE, GRADES_FILE, overview, purge_working_dir, render_comments,
        write_comment_files, write_grades_csv,
    },
    rubric::{GradeTable, Rubric},
};

fn master() -> Rubric {
    Rubric::template([("compiles", 1.0), ("output", 4.0)]).expect("valid rubric")
}

fn graded(student: &str, compiles: f64, output: f64, comments: &str) -> Rubric {
    let mut rubric = Rubric::for_student(&master(), student);
    rubric.set_mark("compiles", compiles).expect("known criterion");
    rubric.set_mark("output", output).expect("known criterion");
    rubric.set_comments(comments);
    rubric.add_marks();
    rubric
}

#[test]
fn lms_sheet_gets_totals_in_the_last_column() {
    let root = tempfile::tempdir().expect("tempdir");
    let sheet = "\
Assignment 1,Points
,
Display ID,ID,Last Name,First Name,grade
jd,123,Doe,Jane,
rr,456,Roe,Rick,
";
    std::fs::write(root.path().join(GRADES_FILE), sheet).expect("write sheet");

    let table: GradeTable = [graded("Doe, Jane(123)", 1.0, 3.5, "")].into_iter().collect();
    let path = write_grades_csv(&table, &master(), root.path()).expect("fill in");

    let written = std::fs::read_to_string(path).expect("read sheet");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines[0], "Assignment 1,Points");
    assert_eq!(lines[2], "Display ID,ID,Last Name,First Name,grade");
    assert_eq!(lines[3], "jd,123,Doe,Jane,4.5");
    assert_eq!(lines[4], "rr,456,Roe,Rick,");
}

#[test]
fn fresh_sheet_uses_the_ledger_layout() {
    let root = tempfile::tempdir().expect("tempdir");
    let table: GradeTable = [graded("a", 1.0, 4.0, "tidy, clear")].into_iter().collect();

    write_grades_csv(&table, &master(), root.path()).expect("write sheet");

    let written = std::fs::read_to_string(root.path().join(GRADES_FILE)).expect("read sheet");
    assert_eq!(
        written,
        "Student,compiles,output,Total,Comments\na,1,4,5,\"tidy, clear\"\n"
    );
}

#[test]
fn comments_file_lists_every_mark() {
    let text = render_comments(&graded("a", 1.0, 2.0, "Watch the off-by-one."));
    assert!(text.starts_with("<pre>#"));
    assert!(text.contains("compiles: 1/1\noutput: 2/4\nTotal: 3\n"));
    assert!(text.ends_with("Comments:\nWatch the off-by-one."));
}

#[test]
fn comment_files_go_to_graded_students_only() {
    let root = tempfile::tempdir().expect("tempdir");
    for name in ["a", "b"] {
        std::fs::create_dir(root.path().join(name)).expect("mkdir student");
    }

    let table: GradeTable = [graded("a", 1.0, 4.0, "")].into_iter().collect();
    let written = write_comment_files(&table, root.path()).expect("write comments");

    assert_eq!(written, 1);
    assert!(root.path().join("a").join(COMMENTS_FILE).is_file());
    assert!(!root.path().join("b").join(COMMENTS_FILE).exists());
}

#[test]
fn purge_empties_the_working_directory() {
    let work = tempfile::tempdir().expect("tempdir");
    std::fs::write(work.path().join(LEDGER_FILE), "Student\n").expect("write ledger");
    std::fs::write(work.path().join("Main.class"), "").expect("write leftover");

    purge_working_dir(work.path()).expect("purge");
    assert_eq!(std::fs::read_dir(work.path()).expect("list").count(), 0);
}

#[test]
fn overview_has_a_row_per_student() {
    let table: GradeTable = [graded("alice", 1.0, 4.0, ""), graded("bob", 0.0, 1.5, "")]
        .into_iter()
        .collect();
    let text = overview(&table, &master());

    assert!(text.contains("Marking Overview"));
    assert!(text.contains("Total (/5)"));
    assert!(text.contains("alice"));
    assert!(text.contains("1.5"));
}
