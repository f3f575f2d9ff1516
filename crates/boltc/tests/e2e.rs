//! End-to-end tests driving the `boltc` binary against real files.

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

fn run_check(source: &str) -> (bool, String) {
    let mut file = NamedTempFile::with_suffix(".bolt").expect("create temp file");
    file.write_all(source.as_bytes()).expect("write source");

    let output = Command::new(env!("CARGO_BIN_EXE_boltc"))
        .arg("check")
        .arg(file.path())
        .output()
        .expect("run boltc");
    (output.status.success(), String::from_utf8_lossy(&output.stderr).into_owned())
}

#[test]
fn clean_program_exits_zero() {
    let (ok, stderr) = run_check(
        "struct Point { pub x: i32; pub y: i32; }\n\
         pub fn origin() Point { return Point{ x: 0, y: 0 }; }\n",
    );
    assert!(ok, "expected success, stderr:\n{stderr}");
}

#[test]
fn type_error_exits_nonzero_with_diagnostic() {
    let (ok, stderr) = run_check("pub fn f() { let x: u8 = true; }\n");
    assert!(!ok);
    assert!(stderr.contains("expected type `u8`, found `bool`"), "stderr:\n{stderr}");
    assert!(stderr.contains("could not compile"), "stderr:\n{stderr}");
}

#[test]
fn syntax_error_exits_nonzero() {
    let (ok, stderr) = run_check("fn f( {}\n");
    assert!(!ok);
    assert!(stderr.contains("expected"), "stderr:\n{stderr}");
}

#[test]
fn missing_input_is_an_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_boltc"))
        .arg("check")
        .output()
        .expect("run boltc");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no input files"));
}
