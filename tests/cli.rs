//! Command-line behaviour of the grin binary

use std::process::Command;

fn grin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_grin"))
}

#[test]
fn test_encode_then_decode() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let encoded = dir.path().join("in.grin");
    let decoded = dir.path().join("out.txt");
    std::fs::write(&input, b"round trip via the command line").unwrap();

    let status = grin().arg("encode").arg(&input).arg(&encoded).status().unwrap();
    assert!(status.success());
    let status = grin().arg("decode").arg(&encoded).arg(&decoded).status().unwrap();
    assert!(status.success());
    assert_eq!(
        std::fs::read(&decoded).unwrap(),
        b"round trip via the command line"
    );
}

#[test]
fn test_wrong_arity_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    std::fs::write(&input, b"data").unwrap();

    let output = grin().arg("encode").arg(&input).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_unknown_command_is_rejected() {
    let output = grin().args(["compress", "a", "b"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn test_decode_failure_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.txt");
    let output_path = dir.path().join("out.txt");
    std::fs::write(&input, b"not grin").unwrap();

    let output = grin()
        .arg("decode")
        .arg(&input)
        .arg(&output_path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("magic number"));
    assert!(!output_path.exists());
}

#[test]
fn test_config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("grin.json");
    let input = dir.path().join("in.txt");
    let encoded = dir.path().join("in.grin");
    std::fs::write(&config, r#"{ "max_input_size": 4 }"#).unwrap();
    std::fs::write(&input, b"too long").unwrap();

    let output = grin()
        .arg("--config")
        .arg(&config)
        .arg("encode")
        .arg(&input)
        .arg(&encoded)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exceeds"));
}

#[test]
fn test_encode_onto_itself_keeps_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    std::fs::write(&input, b"keep me").unwrap();

    let output = grin().arg("encode").arg(&input).arg(&input).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("same file"));
    assert_eq!(std::fs::read(&input).unwrap(), b"keep me");
}
