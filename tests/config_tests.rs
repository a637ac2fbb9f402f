use std::path::{Path, PathBuf};

use marking::config::{
    DEFAULT_SUBMISSION_DIR, MarkingConfig, RunTarget, SAMPLE_CONFIG, write_sample,
};

const MINIMAL: &str = r#"
[config]
root = "students"
working = "scratch"

[editor]
command = "vim"

[language]
name = "python"

[[rubric]]
name = "runs"
max = 2

[[rubric]]
name = "style"
max = 0.5
"#;

#[test]
fn sample_config_parses() {
    let config = MarkingConfig::from_toml_str(SAMPLE_CONFIG, Path::new("/base"))
        .expect("sample config is valid");

    let names: Vec<&str> = config.rubric().names().collect();
    assert_eq!(names, ["compiles", "runs", "output"]);
    assert_eq!(config.rubric().out_of(), 6.0);
    assert_eq!(config.toolchain().compiler.as_deref(), Some("javac"));
    assert_eq!(config.toolchain().run_target, RunTarget::Stem);
    assert_eq!(config.input_files().len(), 2);
    assert_eq!(config.output_files().len(), 2);
    assert!(config.diff());
    assert!(config.make_csv());
    assert_eq!(config.submission_dir(), DEFAULT_SUBMISSION_DIR);
    assert_eq!(config.editor_args(), ["-o"]);
}

#[test]
fn relative_paths_resolve_against_the_base() {
    let config =
        MarkingConfig::from_toml_str(MINIMAL, Path::new("/course/a1")).expect("valid config");

    assert_eq!(config.root(), Path::new("/course/a1/students"));
    assert_eq!(config.working_dir(), Path::new("/course/a1/scratch"));
    assert!(config.input_files().is_empty());
    assert!(!config.diff());
    assert!(config.script().is_none());
}

#[test]
fn python_preset_has_no_compiler() {
    let config = MarkingConfig::from_toml_str(MINIMAL, Path::new("/b")).expect("valid config");
    let toolchain = config.toolchain();

    assert_eq!(toolchain.extension, ".py");
    assert!(toolchain.compiler.is_none());
    assert_eq!(toolchain.run_target, RunTarget::File);
    assert!(toolchain.is_source(Path::new("/w/Main.PY")));
    assert!(!toolchain.is_source(Path::new("/w/notes.txt")));
}

#[test]
fn language_fields_override_the_preset() {
    let text = MINIMAL.replace(
        "name = \"python\"",
        "name = \"java\"\ncompiler = \"\"\nruntime = \"jshell\"\nrun_args = [\"-q\"]",
    );
    let config = MarkingConfig::from_toml_str(&text, Path::new("/b")).expect("valid config");
    let toolchain = config.toolchain();

    assert!(toolchain.compiler.is_none());
    assert_eq!(toolchain.runtime, "jshell");
    assert_eq!(toolchain.run_args, ["-q"]);
    assert_eq!(toolchain.generated_extension.as_deref(), Some(".class"));
}

#[test]
fn diff_without_master_outputs_is_rejected() {
    let text = format!("{MINIMAL}\n[io]\ninput = \"in.txt\"\ndiff = true\n");
    let err = MarkingConfig::from_toml_str(&text, Path::new("/b")).expect_err("no outputs");
    assert!(format!("{err:#}").contains("no output files"));
}

#[test]
fn unknown_keys_are_rejected() {
    let text = MINIMAL.replace("command = \"vim\"", "command = \"vim\"\ncolour = \"blue\"");
    assert!(MarkingConfig::from_toml_str(&text, Path::new("/b")).is_err());
}

#[test]
fn duplicate_rubric_names_are_rejected() {
    let text = format!("{MINIMAL}\n[[rubric]]\nname = \"runs\"\nmax = 1\n");
    let err = MarkingConfig::from_toml_str(&text, Path::new("/b")).expect_err("duplicate");
    assert!(format!("{err:#}").contains("more than once"));
}

#[test]
fn generated_extension_must_differ_from_source() {
    let text = MINIMAL.replace(
        "name = \"python\"",
        "name = \"python\"\ngenerated_extension = \".py\"",
    );
    assert!(MarkingConfig::from_toml_str(&text, Path::new("/b")).is_err());
}

#[test]
fn verify_fails_without_a_root_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = MarkingConfig::from_toml_str(MINIMAL, dir.path()).expect("valid config");
    assert!(config.verify().is_err());
}

#[test]
fn aux_files_are_listed_as_shared() {
    let text = format!("{MINIMAL}\n[aux]\nfiles = \"helper.py; data/table.txt ;\"\n");
    let config = MarkingConfig::from_toml_str(&text, Path::new("/b")).expect("valid config");

    let shared: Vec<PathBuf> = config.shared_files().cloned().collect();
    assert_eq!(
        shared,
        [PathBuf::from("/b/helper.py"), PathBuf::from("/b/data/table.txt")]
    );
}

#[test]
fn write_sample_refuses_to_overwrite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sample.toml");

    write_sample(&path).expect("first write");
    assert_eq!(std::fs::read_to_string(&path).expect("read"), SAMPLE_CONFIG);
    assert!(write_sample(&path).is_err());
}
