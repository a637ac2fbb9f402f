use std::path::{Path, PathBuf};

use marking::util::{find_by_stem, find_files, format_elapsed, remove_if_exists, split_path_list};

#[test]
fn stems_match_ignoring_case() {
    let candidates = split_path_list(Path::new("/io"), "lab1.txt;Main.txt");
    assert_eq!(
        find_by_stem(&candidates, Path::new("/work/main.java")),
        Some(&PathBuf::from("/io/Main.txt"))
    );
    assert_eq!(find_by_stem(&candidates, Path::new("/work/Other.java")), None);
}

#[test]
fn find_files_only_looks_at_the_top_level() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("A.class"), "").expect("write");
    std::fs::create_dir(dir.path().join("nested")).expect("mkdir");
    std::fs::write(dir.path().join("nested/B.class"), "").expect("write");

    let found = find_files(".class", 0, dir.path()).expect("glob");
    assert_eq!(found, [dir.path().join("A.class")]);
}

#[test]
fn elapsed_time_is_hours_minutes_seconds() {
    assert_eq!(format_elapsed(0), "0:00:00");
    assert_eq!(format_elapsed(3725), "1:02:05");
}

#[test]
fn removing_a_missing_file_is_fine() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gone.txt");
    std::fs::write(&path, "x").expect("write");

    assert!(remove_if_exists(&path).expect("first remove"));
    assert!(!remove_if_exists(&path).expect("second remove"));
}
