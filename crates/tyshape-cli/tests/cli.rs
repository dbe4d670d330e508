//! Tests for the `tyshape` binary.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::{json, Value};
use tempfile::tempdir;

fn tyshape(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tyshape"));
    cmd.current_dir(dir);
    cmd.env_remove("TYSHAPE_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|err| panic!("bad JSON ({err}):\n{stdout}"))
}

#[test]
fn convert_file_prints_shape() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("user.d.ts"),
        "interface User { id: number; status: \"active\" | \"inactive\" }",
    )
    .unwrap();

    let output = tyshape(dir.path())
        .args(["convert", "user.d.ts"])
        .output()
        .unwrap();

    assert!(output.status.success(), "command failed: {:?}", output);
    assert_eq!(
        stdout_json(&output),
        json!({ "user": { "id": "number", "status": ["\"active\"", "\"inactive\""] } })
    );
}

#[test]
fn convert_reads_stdin() {
    let dir = tempdir().unwrap();
    let mut child = tyshape(dir.path())
        .args(["convert", "-", "--compact"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"type InlineDeclare = string | number;\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "command failed: {:?}", output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"inlinedeclare":["string","number"]}"#
    );
}

#[test]
fn convert_with_output_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("point.ts"), "type Point = { x: number; y: number };").unwrap();

    let status = tyshape(dir.path())
        .args(["convert", "point.ts", "--out", "point.json"])
        .status()
        .unwrap();

    assert!(status.success());
    let written = fs::read_to_string(dir.path().join("point.json")).unwrap();
    let value: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value, json!({ "point": { "x": "number", "y": "number" } }));
}

#[test]
fn convert_reports_parse_errors_but_succeeds() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("broken.ts"),
        "interface A { a: string }\ntype Broken = ;\ntype B = boolean;\n",
    )
    .unwrap();

    let output = tyshape(dir.path())
        .args(["convert", "broken.ts"])
        .output()
        .unwrap();

    assert!(output.status.success(), "command failed: {:?}", output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.ts"), "stderr was:\n{stderr}");
    assert_eq!(
        stdout_json(&output),
        json!({ "a": { "a": "string" }, "b": "boolean" })
    );
}

#[test]
fn check_fails_on_parse_errors() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.ts"), "interface { nope }").unwrap();
    fs::write(dir.path().join("good.ts"), "interface Fine { ok: boolean }").unwrap();

    let bad = tyshape(dir.path()).args(["check", "bad.ts"]).output().unwrap();
    assert_eq!(bad.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&bad.stderr).contains("1 parse error(s)"));

    let good = tyshape(dir.path()).args(["check", "good.ts"]).output().unwrap();
    assert!(good.status.success());
    assert!(String::from_utf8_lossy(&good.stdout).contains("good.ts: ok"));
}

#[test]
fn demo_prints_all_samples() {
    let dir = tempdir().unwrap();
    let output = tyshape(dir.path()).args(["demo", "--compact"]).output().unwrap();

    assert!(output.status.success(), "command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("interface User {"));
    assert!(stdout.contains(r#"{"complexalias":["{ id: number; name: string; }","{ age: number }"]}"#));
}

#[test]
fn config_file_controls_pretty_printing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("tyshape.toml"), "[output]\npretty = false\n").unwrap();
    fs::write(dir.path().join("a.ts"), "type A = { a: string };").unwrap();

    let output = tyshape(dir.path()).args(["convert", "a.ts"]).output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        r#"{"a":{"a":"string"}}"#
    );
}

#[test]
fn invalid_config_is_an_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("custom.toml"), "[output]\npretty = 3\n").unwrap();

    let output = tyshape(dir.path())
        .args(["--config", "custom.toml", "demo"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid config custom.toml"));
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempdir().unwrap();
    let output = tyshape(dir.path())
        .args(["convert", "nope.ts"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read nope.ts"));
}
