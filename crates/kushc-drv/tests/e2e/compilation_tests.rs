//! Whole-pipeline tests: lexing through C emission, driven through the
//! `kushc` binary rather than library calls, mirroring the teacher's
//! `e2e::compilation_tests` structure.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn kushc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_kushc"))
}

fn write_source(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("failed to write fixture source");
    path
}

#[test]
fn well_formed_function_emits_c_source_alongside_input() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let input = write_source(&temp_dir, "identity.kush", "i32 identity(i32 x) { return x; }");

    let mut cmd = Command::new(kushc_bin());
    cmd.arg(&input);

    cmd.assert().success();

    let c_path = input.with_extension("c");
    assert!(c_path.exists(), "emitted C source should exist next to the input file");
    let emitted = std::fs::read_to_string(&c_path).unwrap();
    assert!(emitted.contains("int32_t identity(int32_t x)"));
}

#[test]
fn struct_declaration_emits_typedef_and_constructor() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let input = write_source(&temp_dir, "point.kush", "struct Point { i32 x; i32 y; }");

    let mut cmd = Command::new(kushc_bin());
    cmd.arg(&input);

    cmd.assert().success();

    let emitted = std::fs::read_to_string(input.with_extension("c")).unwrap();
    assert!(emitted.contains("typedef struct Point Point;"));
    assert!(emitted.contains("Point_new"));
}

#[test]
fn instructions_flag_prints_emitted_c_to_stdout() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let input = write_source(&temp_dir, "main.kush", "i32 main() { return 0; }");

    let mut cmd = Command::new(kushc_bin());
    cmd.arg("--instructions").arg(&input);

    cmd.assert().success().stdout(predicate::str::contains("int32_t main(void)"));
}

#[test]
fn syntax_error_reports_bracketed_diagnostic_and_fails() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let input = write_source(&temp_dir, "broken.kush", "i32 main() { return 0");

    let mut cmd = Command::new(kushc_bin());
    cmd.arg(&input);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("[error]").and(predicate::str::contains("broken.kush")));
}

#[test]
fn undefined_symbol_fails_at_the_semantic_stage() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let input = write_source(&temp_dir, "undef.kush", "i32 main() { return missing; }");

    let mut cmd = Command::new(kushc_bin());
    cmd.arg(&input);

    cmd.assert().failure().stderr(predicate::str::contains("[error]"));
}

#[test]
fn multiple_input_files_compile_independently() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let first = write_source(&temp_dir, "a.kush", "i32 a() { return 1; }");
    let second = write_source(&temp_dir, "b.kush", "i32 b() { return 2; }");

    let mut cmd = Command::new(kushc_bin());
    cmd.arg(&first).arg(&second);

    cmd.assert().success();
    assert!(first.with_extension("c").exists());
    assert!(second.with_extension("c").exists());
}
