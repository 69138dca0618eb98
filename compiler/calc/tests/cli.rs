// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! The `calc` binary as the chat command sees it.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;

fn run(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_calc"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start calc");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn empty_input_prints_usage() {
    let output = run(&[], "");
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("Usage: calc"));
}

#[test]
fn arguments_are_joined_into_one_script() {
    let output = run(&["2", "**", "10"], "");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "1024\n");
}

#[test]
fn bindings_follow_the_result() {
    let output = run(&["--in-process"], "b = 2\na = 1\na + b\n");
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "3\na = 1\nb = 2\n");
}

#[test]
fn exact_flag_switches_literals() {
    let output = run(&["--exact", "1.1 + 2.2"], "");
    assert_eq!(stdout(&output), "Decimal('3.3')\n");
}

#[test]
fn failures_exit_nonzero() {
    let output = run(&["1 + 'a'"], "");
    assert!(!output.status.success());
    assert_eq!(
        stderr(&output).trim_end(),
        "TypeError: unsupported operand type(s) for +: 'int' and 'str'"
    );
}

#[test]
fn timeout_flag_is_honored() {
    let output = run(&["--timeout=0.2"], "while True:\n    pass\n");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("timed out"));
}

#[test]
fn bad_flag_reports_usage() {
    let output = run(&["--bogus", "1"], "");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown option '--bogus'"));
}
