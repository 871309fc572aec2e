//! CLI surface tests: `--help`, `--version`, and the flag-parsing
//! contract inherited from the original `kush` driver's `compileEx`
//! (`examples/original_source/source/compiler.c`).

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
fn help_flag_prints_usage() {
    let mut cmd = Command::new(kushc_bin());
    cmd.arg("--help");

    cmd.assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_prints_version() {
    let mut cmd = Command::new(kushc_bin());
    cmd.arg("--version");

    cmd.assert().success().stdout(predicate::str::contains("kush v"));
}

#[test]
fn missing_input_files_is_an_error() {
    let mut cmd = Command::new(kushc_bin());

    cmd.assert().failure().stderr(predicate::str::contains("input files"));
}

#[test]
fn unknown_flag_is_rejected() {
    let mut cmd = Command::new(kushc_bin());
    cmd.arg("--bogus-flag");

    cmd.assert().failure().stderr(predicate::str::contains("Unknown flag"));
}

#[test]
fn unknown_log_level_is_rejected() {
    let mut cmd = Command::new(kushc_bin());
    cmd.arg("--log").arg("catastrophic");

    cmd.assert().failure().stderr(predicate::str::contains("Unknown log level"));
}

#[test]
fn tokens_flag_dumps_lexer_output() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let input = write_source(&temp_dir, "main.kush", "i32 main() { return 0; }");

    let mut cmd = Command::new(kushc_bin());
    cmd.arg("--tokens").arg(&input);

    cmd.assert().success().stdout(predicate::str::contains("kind:"));
}

#[test]
fn nodes_flag_dumps_parsed_ast() {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let input = write_source(&temp_dir, "main.kush", "i32 main() { return 0; }");

    let mut cmd = Command::new(kushc_bin());
    cmd.arg("--nodes").arg(&input);

    cmd.assert().success().stdout(predicate::str::contains("Module"));
}
