use marking::diff::{DiffOutcome, diff_lines, split_lines};

#[test]
fn identical_output_matches() {
    let expected = split_lines("hello\nworld\n");
    let actual = split_lines("hello\nworld\n");
    assert!(diff_lines(&expected, &actual).is_match());
}

#[test]
fn empty_output_is_reported_as_such() {
    let expected = split_lines("hello\n");
    assert_eq!(diff_lines(&expected, &[]), DiffOutcome::NoOutput);
}

#[test]
fn missing_trailing_newline_is_a_difference() {
    let expected = split_lines("a\n");
    let actual = split_lines("a");
    assert!(!diff_lines(&expected, &actual).is_match());
}

#[test]
fn changed_line_gets_a_marker_line() {
    let outcome = diff_lines(&["x\n"], &["z\n"]);
    let DiffOutcome::Mismatch { lines } = outcome else {
        panic!("expected a mismatch, got {outcome:?}");
    };
    assert_eq!(lines, ["- x", "+ z", "? ^"]);
    assert_eq!(lines.iter().filter(|l| l.starts_with("? ")).count(), 1);
}

#[test]
fn extra_line_shows_as_insertion() {
    let expected = split_lines("one\ntwo\n");
    let actual = split_lines("one\ntwo\nthree\n");
    let DiffOutcome::Mismatch { lines } = diff_lines(&expected, &actual) else {
        panic!("expected a mismatch");
    };
    assert_eq!(lines, ["  one", "  two", "+ three"]);
}

#[test]
fn missing_line_shows_as_deletion() {
    let expected = split_lines("one\ntwo\n");
    let actual = split_lines("two\n");
    let DiffOutcome::Mismatch { lines } = diff_lines(&expected, &actual) else {
        panic!("expected a mismatch");
    };
    assert_eq!(lines, ["- one", "  two"]);
}
