use marking::rubric::{GradeTable, Rubric, RubricError};

fn master() -> Rubric {
    Rubric::template([("compiles", 1.0), ("runs", 1.0), ("output", 4.0)]).expect("valid rubric")
}

#[test]
fn template_keeps_configured_order() {
    let rubric = master();
    let names: Vec<&str> = rubric.names().collect();
    assert_eq!(names, ["compiles", "runs", "output"]);
    assert_eq!(rubric.out_of(), 6.0);
    assert_eq!(rubric.total(), 0.0);
}

#[test]
fn template_rejects_bad_criteria() {
    assert_eq!(
        Rubric::template(Vec::<(String, f64)>::new()),
        Err(RubricError::Empty)
    );
    assert_eq!(
        Rubric::template([("a", 1.0), ("a", 2.0)]),
        Err(RubricError::Duplicate("a".into()))
    );
    assert_eq!(
        Rubric::template([("style: neat", 1.0)]),
        Err(RubricError::ReservedName("style: neat".into()))
    );
    assert_eq!(
        Rubric::template([("# heading", 1.0)]),
        Err(RubricError::ReservedName("# heading".into()))
    );
    assert!(matches!(
        Rubric::template([("a", -1.0)]),
        Err(RubricError::InvalidMax { .. })
    ));
    assert!(matches!(
        Rubric::template([("a", f64::NAN)]),
        Err(RubricError::InvalidMax { .. })
    ));
}

#[test]
fn add_marks_sums_regardless_of_order() {
    let template = Rubric::template([("a", 5.0), ("b", 5.0)]).expect("valid rubric");

    let mut first = Rubric::for_student(&template, "s");
    first.set_mark("a", 3.0).expect("known criterion");
    first.set_mark("b", 4.0).expect("known criterion");

    let mut second = Rubric::for_student(&template, "s");
    second.set_mark("b", 4.0).expect("known criterion");
    second.set_mark("a", 3.0).expect("known criterion");

    assert_eq!(first.add_marks(), 7.0);
    assert_eq!(second.add_marks(), 7.0);
    assert_eq!(first.total(), second.total());
}

#[test]
fn add_marks_recomputes() {
    let mut rubric = Rubric::for_student(&master(), "s");
    rubric.set_mark("output", 2.5).expect("known criterion");
    assert_eq!(rubric.add_marks(), 2.5);
    assert_eq!(rubric.add_marks(), 2.5);
}

#[test]
fn for_student_starts_blank() {
    let mut template = master();
    template.set_mark("runs", 1.0).expect("known criterion");
    template.set_comments("leftover");

    let copy = Rubric::for_student(&template, "Doe, Jane(123)");
    assert_eq!(copy.student(), "Doe, Jane(123)");
    assert!(copy.criteria().iter().all(|c| c.mark == 0.0));
    assert_eq!(copy.comments(), "");
    assert!(copy.same_shape(&template));
    assert_eq!(copy.criteria()[2].max, 4.0);
}

#[test]
fn unknown_criterion_is_rejected() {
    let mut rubric = Rubric::for_student(&master(), "s");
    assert_eq!(
        rubric.set_mark("style", 1.0),
        Err(RubricError::UnknownCriterion("style".into()))
    );
}

#[test]
fn display_shows_total_out_of_max() {
    let mut rubric = Rubric::for_student(&master(), "alice");
    rubric.set_mark("compiles", 1.0).expect("known criterion");
    rubric.set_mark("output", 3.5).expect("known criterion");
    rubric.add_marks();
    assert_eq!(rubric.to_string(), "alice: 4.5/6");
}

#[test]
fn grade_table_finds_by_student() {
    let template = master();
    let table: GradeTable = ["a", "b"]
        .into_iter()
        .map(|s| Rubric::for_student(&template, s))
        .collect();

    assert_eq!(table.len(), 2);
    assert!(table.find("b").is_some());
    assert!(table.find("c").is_none());
    let order: Vec<&str> = table.iter().map(Rubric::student).collect();
    assert_eq!(order, ["a", "b"]);
}
