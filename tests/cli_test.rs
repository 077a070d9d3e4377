//! End-to-end tests for the trinity binary
//!
//! Each test builds a small project in a temp directory and runs the real
//! binary against it, with the score history redirected to a temp cache.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn healthy_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "README.md", "# Demo\n\nSee [changes](CHANGELOG.md).\n");
    write(root, "CHANGELOG.md", "## 0.1.0\n");
    write(root, "src/util.ts", "export const add = (a: number, b: number) => a + b;\n");
    write(root, "src/format.ts", "export const fmt = (n: number) => `${n}`;\n");
    write(
        root,
        "src/app.ts",
        "import { add } from './util';\nimport { fmt } from './format';\nexport const total = fmt(add(1, 2));\n",
    );
    write(root, "__tests__/util.test.ts", "import { add } from '../src/util';\n");
    write(root, "__tests__/format.test.ts", "import { fmt } from '../src/format';\n");
    write(root, "__tests__/app.test.ts", "import { total } from '../src/app';\n");
    dir
}

fn untested_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "README.md", "# Untested\n");
    for i in 0..5 {
        write(dir.path(), &format!("src/module{}.ts", i), "export const x = 1;\n");
    }
    dir
}

fn trinity(cache: &Path, args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trinity"))
        .args(args)
        .current_dir(cwd)
        .env("TRINITY_CACHE_DIR", cache)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run trinity")
}

fn run_validate(dir: &Path, extra_args: &[&str]) -> (i32, String) {
    let cache = tempfile::tempdir().unwrap();
    let path = dir.to_string_lossy().to_string();
    let mut args = vec!["validate", path.as_str()];
    args.extend_from_slice(extra_args);
    let output = trinity(cache.path(), &args, dir);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    (output.status.code().unwrap_or(-1), stdout)
}

#[test]
fn test_healthy_project_exits_zero() {
    let dir = healthy_project();
    let (code, stdout) = run_validate(dir.path(), &[]);
    assert_eq!(code, 0, "stdout:\n{}", stdout);
    assert!(stdout.contains("Validation passed"));
}

#[test]
fn test_untested_project_exits_one() {
    let dir = untested_project();
    let (code, stdout) = run_validate(dir.path(), &[]);
    assert_eq!(code, 1);
    assert!(stdout.contains("Validation failed"));
}

#[test]
fn test_min_score_override_changes_outcome() {
    let dir = healthy_project();
    write(dir.path(), "src/extra.ts", "export const extra = 1;\n");

    let (code, _) = run_validate(dir.path(), &[]);
    assert_eq!(code, 0);
    let (code, _) = run_validate(dir.path(), &["--min-score", "100"]);
    assert_eq!(code, 1);
}

#[test]
fn test_json_output_contract() {
    let dir = untested_project();
    let (code, stdout) = run_validate(dir.path(), &["--format", "json"]);
    assert_eq!(code, 1);

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(json["valid"], false);
    assert_eq!(json["score"]["test"], 0);
    assert!(json["score"]["overall"].as_u64().unwrap() < 90);
    assert_eq!(json["metadata"]["mode"], "all");
    assert!(json["metadata"]["projectName"].is_string());
    assert_eq!(json["synchronization"]["missingTests"].as_array().unwrap().len(), 5);
    assert!(!json["recommendations"].as_array().unwrap().is_empty());
}

#[test]
fn test_mid_dev_mode_skips_synchronization() {
    let dir = untested_project();
    let (_, stdout) = run_validate(dir.path(), &["--mode", "mid-dev", "--format", "json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON");
    assert_eq!(json["metadata"]["mode"], "mid-dev");
    assert!(json["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .all(|w| w["category"] != "synchronization"));
}

#[test]
fn test_html_report_written_to_output() {
    let dir = healthy_project();
    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("report.html");
    let (code, stdout) = run_validate(
        dir.path(),
        &["--format", "html", "-o", target.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    assert!(!stdout.contains("<!DOCTYPE html>"));

    let html = std::fs::read_to_string(&target).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("Trinity"));
}

#[test]
fn test_init_writes_config() {
    let dir = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let path = dir.path().to_string_lossy().to_string();
    let output = trinity(
        cache.path(),
        &["init", path.as_str(), "--template", "library"],
        dir.path(),
    );
    assert!(output.status.success());

    let toml = std::fs::read_to_string(dir.path().join("trinity.toml")).unwrap();
    assert!(toml.contains("require_docs = true"));
}

#[test]
fn test_config_show_prints_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let output = trinity(cache.path(), &["config", "show"], dir.path());
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: toml::Value = toml::from_str(&stdout).expect("Invalid TOML");
    assert_eq!(parsed["validation"]["min_trinity_score"].as_integer(), Some(90));
}

#[test]
fn test_history_records_runs() {
    let dir = healthy_project();
    let cache = tempfile::tempdir().unwrap();
    let path = dir.path().to_string_lossy().to_string();

    for _ in 0..2 {
        let output = trinity(cache.path(), &["validate", path.as_str()], dir.path());
        assert!(output.status.success());
    }

    let output = trinity(cache.path(), &["history", path.as_str(), "--json"], dir.path());
    assert!(output.status.success());
    let entries: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON");
    assert_eq!(entries.as_array().unwrap().len(), 2);
}

#[test]
fn test_version_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = trinity(dir.path(), &["version"], dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("trinity "));
}

#[test]
fn test_unknown_subcommand_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = trinity(dir.path(), &["vaildate"], dir.path());
    assert!(!output.status.success());
}
