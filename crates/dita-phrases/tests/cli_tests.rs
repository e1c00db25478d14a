/*
 * cli_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Tests that run the dita-phrases binary.
 */

use pretty_assertions::assert_eq;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn command(args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_dita-phrases"));
    command.args(args).env_remove("RUST_LOG");
    command
}

fn run(args: &[&str]) -> Output {
    command(args)
        .output()
        .expect("Failed to execute dita-phrases")
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    command(args)
        .current_dir(dir)
        .output()
        .expect("Failed to execute dita-phrases")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_input(dir: &Path, content: &str) -> String {
    let path = dir.join("attrs.adoc");
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_version() {
    for flag in ["-v", "--version"] {
        let output = run(&[flag]);
        assert!(output.status.success());
        assert_eq!(
            stdout(&output).trim_end(),
            format!("dita-phrases {}", env!("CARGO_PKG_VERSION"))
        );
    }
}

#[test]
fn test_help() {
    let output = run(&["-h"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("dita-phrases [-i ID] [-t TITLE] FILE"));
    assert!(text.contains("dita-phrases -h|-v"));
    assert!(text.contains("specify the topic id"));
    assert!(text.contains("display this help and exit"));
}

#[test]
fn test_no_arguments_prints_usage() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "Usage: dita-phrases [-i ID] [-t TITLE] FILE\n       dita-phrases -h|-v\n\n\
         Run 'dita-phrases -h' for more information\n"
    );
}

#[test]
fn test_invalid_id() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), ":version: 1.0\n");

    let output = run(&["-i", "bad id", &input]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "dita-phrases: Invalid XML ID: bad id\n");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_too_many_arguments() {
    let output = run(&["a.adoc", "b.adoc"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "dita-phrases: Invalid number of arguments\n");
}

#[test]
fn test_missing_file() {
    let output = run(&["does-not-exist.adoc"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        "dita-phrases: File does not exist: does-not-exist.adoc\n"
    );
}

#[test]
fn test_directory_is_not_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().to_string_lossy().into_owned();

    let output = run(&[&path]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), format!("dita-phrases: Not a file: {path}\n"));
    assert!(output.stdout.is_empty());
}

#[cfg(unix)]
#[test]
fn test_unreadable_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), ":version: 1.0\n");
    std::fs::set_permissions(&input, std::fs::Permissions::from_mode(0o000)).unwrap();
    if std::fs::File::open(&input).is_ok() {
        // Permission bits do not apply to root.
        return;
    }

    let output = run(&[&input]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stderr(&output),
        format!("dita-phrases: File not readable: {input}\n")
    );
    assert!(output.stdout.is_empty());
}

#[test]
fn test_includes_resolve_against_working_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("shared.adoc"), ":from-cwd: yes\n").unwrap();
    std::fs::create_dir(dir.path().join("docs")).unwrap();
    std::fs::write(
        dir.path().join("docs/attrs.adoc"),
        "include::shared.adoc[]\n:local: 1\n",
    )
    .unwrap();

    let output = run_in(dir.path(), &["docs/attrs.adoc"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("      <li><ph id=\"from-cwd\">yes</ph></li>\n"));
    assert!(text.contains("      <li><ph id=\"local\">1</ph></li>\n"));
    assert!(stderr(&output).is_empty());
}

#[test]
fn test_unknown_option() {
    let output = run(&["--bogus", "a.adoc"]);
    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.starts_with("dita-phrases: "), "unexpected stderr: {text}");
    assert!(text.contains("--bogus"));
}

#[test]
fn test_generates_topic() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), ":version: 1.0\n:experimental:\n");

    let output = run(&["-t", "Widget & Co", &input]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "<?xml version='1.0' encoding='utf-8' ?>\n\
         <!DOCTYPE concept PUBLIC \"-//OASIS//DTD DITA Concept//EN\" \"concept.dtd\">\n\
         <concept id=\"product-attributes\">\n  \
         <title>Widget &amp; Co</title>\n  \
         <conbody>\n    \
         <ul>\n      \
         <li><ph id=\"version\">1.0</ph></li>\n    \
         </ul>\n  \
         </conbody>\n\
         </concept>\n"
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "= Title\n:product: *Widget*\n:url: https://example.com\n");

    let first = run(&["--layout", "paragraph", &input]);
    let second = run(&["--layout", "paragraph", &input]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert!(stdout(&first).contains("    <p><ph id=\"product\"><b>Widget</b></ph></p>\n"));
}
