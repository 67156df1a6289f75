//! Command-line tests driving the compiled `docmark` binary.

use super::test_harness::*;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn docmark(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docmark"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run docmark binary")
}

fn write_source(dir: &Path, pages: usize) -> String {
    let path = dir.join("original.pdf");
    std::fs::write(&path, build_letter_pdf(pages)).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_apply_names_output_after_report_and_route() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), 2);

    let output = docmark(&[
        "apply",
        "-i",
        &input,
        "-n",
        CPF,
        "--report-number",
        "0042",
        "--delivery",
        "shared",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let written = dir.path().join("relatorio_0042_compartilhado.pdf");
    let pages = inspect(&std::fs::read(written).unwrap());
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].tile_count(TOKEN), 147);
}

#[test]
fn test_apply_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), 1);

    let output = docmark(&["apply", "-i", &input, "-n", CPF, "-o", "-"]);
    assert!(output.status.success());
    assert!(output.stdout.starts_with(b"%PDF-"));
    assert_eq!(inspect(&output.stdout).len(), 1);
}

#[test]
fn test_apply_rejects_short_identifier() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), 1);
    let target = dir.path().join("out.pdf");

    let output = docmark(&[
        "apply",
        "-i",
        &input,
        "-n",
        "abc123",
        "-o",
        target.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid identifier"));
    assert!(!target.exists());
}

#[test]
fn test_apply_reports_missing_source() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("ausente.pdf");

    let output = docmark(&["apply", "-i", missing.to_str().unwrap(), "-n", CPF]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn test_plan_prints_json_layout() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), 3);

    let output = docmark(&["plan", "-i", &input, "-n", CPF]);
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let pages = plan.as_array().unwrap();
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0]["tiles"], 147);
    assert_eq!(pages[0]["layout"]["spacing_x"], 122);
    assert_eq!(pages[0]["layout"]["spacing_y"], 42);
}

#[test]
fn test_check_config_loads_yaml_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("docmark.yaml");
    std::fs::write(
        &config,
        "watermark:\n  style:\n    color: \"#FF0000\"\n    opacity: 0.3\nlogging:\n  level: warn\n",
    )
    .unwrap();

    let output = docmark(&["-c", config.to_str().unwrap(), "check-config"]);
    assert!(output.status.success());

    let echoed: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(echoed["watermark"]["style"]["color"], "#FF0000");
    assert_eq!(echoed["logging"]["level"], "warn");
}

#[test]
fn test_invalid_config_exits_with_code_2() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("docmark.yaml");
    std::fs::write(&config, "watermark:\n  style:\n    opacity: 1.5\n").unwrap();

    let output = docmark(&["-c", config.to_str().unwrap(), "check-config"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_apply_refuses_source_reached_through_parent_alias() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), 1);
    let before = std::fs::read(&input).unwrap();
    let alias = dir
        .path()
        .join("..")
        .join(dir.path().file_name().unwrap())
        .join("original.pdf");

    let output = docmark(&["apply", "-i", &input, "-n", CPF, "-o", alias.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Refusing to overwrite"));
    assert_eq!(std::fs::read(&input).unwrap(), before);
}

#[cfg(unix)]
#[test]
fn test_apply_refuses_symlink_to_source() {
    let dir = TempDir::new().unwrap();
    let input = write_source(dir.path(), 1);
    let before = std::fs::read(&input).unwrap();
    let link = dir.path().join("link.pdf");
    std::os::unix::fs::symlink(&input, &link).unwrap();

    let output = docmark(&["apply", "-i", &input, "-n", CPF, "-o", link.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(std::fs::read(&input).unwrap(), before);
}
