//! CLI integration tests
//!
//! Runs the compiled binary and checks output formats and exit codes.

mod support;

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use support::project;
use tempfile::TempDir;

fn buildsense(cache_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_buildsense"));
    cmd.env("BUILDSENSE_CACHE_DIR", cache_dir)
        .env("BUILDSENSE_LOG_LEVEL", "error")
        .env_remove("BUILDSENSE_CACHE_ENABLED")
        .env_remove("BUILDSENSE_MIN_CONFIDENCE");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("Failed to execute buildsense")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, stdout))
}

#[test]
fn test_cli_help() {
    let cache = TempDir::new().unwrap();
    let output = run(buildsense(cache.path()).arg("--help"));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["classify", "resolve", "build", "cache"] {
        assert!(stdout.contains(command), "help is missing {}", command);
    }
}

#[test]
fn test_cli_version() {
    let cache = TempDir::new().unwrap();
    let output = run(buildsense(cache.path()).arg("--version"));

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_unknown_command_fails() {
    let cache = TempDir::new().unwrap();
    let output = run(buildsense(cache.path()).arg("deploy"));
    assert!(!output.status.success());
}

#[test]
fn test_classify_json() {
    let cache = TempDir::new().unwrap();
    let proj = project(support::REACT_LIBRARY);
    let output = run(buildsense(cache.path())
        .args(["classify", "--format", "json"])
        .arg(proj.path()));

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json["category"], "react");
    assert_eq!(json["fallback"], false);
    assert!(json["confidence"].as_f64().unwrap() >= 0.6);
    assert!(json["alternatives"].as_array().unwrap().len() > 1);
}

#[test]
fn test_classify_project_taxonomy_human() {
    let cache = TempDir::new().unwrap();
    let proj = project(support::NEXT_APP);
    let output = run(buildsense(cache.path())
        .args(["classify", "--taxonomy", "project"])
        .arg(proj.path()));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Classification"));
    assert!(stdout.contains("react-next"));
}

#[test]
fn test_resolve_yaml_with_mode() {
    let cache = TempDir::new().unwrap();
    let proj = project(support::VUE3_LIBRARY);
    let output = run(buildsense(cache.path())
        .args(["resolve", "--format", "yaml", "--mode", "development"])
        .arg(proj.path()));

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let yaml: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(yaml["category"].as_str(), Some("vue3"));
    assert_eq!(yaml["config"]["mode"].as_str(), Some("development"));
}

#[test]
fn test_resolve_with_override_file() {
    let cache = TempDir::new().unwrap();
    let proj = project(support::REACT_LIBRARY);
    let overrides = proj.path().join("buildsense.json");
    std::fs::write(&overrides, r#"{"libraryType": "typescript", "input": "src/lib.ts"}"#).unwrap();

    let output = run(buildsense(cache.path())
        .args(["resolve", "--format", "json", "--config"])
        .arg(&overrides)
        .arg(proj.path()));

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json["category"], "typescript");
    assert_eq!(json["forced"], true);
    assert_eq!(json["config"]["input"], "src/lib.ts");
}

#[test]
fn test_resolve_invalid_mode_exits_nonzero() {
    let cache = TempDir::new().unwrap();
    let proj = project(support::REACT_LIBRARY);
    let output = run(buildsense(cache.path())
        .args(["resolve", "--mode", "staging"])
        .arg(proj.path()));

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}

#[test]
fn test_resolve_missing_override_file_exits_nonzero() {
    let cache = TempDir::new().unwrap();
    let proj = project(support::REACT_LIBRARY);
    let output = run(buildsense(cache.path())
        .args(["resolve", "--config"])
        .arg(proj.path().join("nope.json"))
        .arg(proj.path()));

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_cache_stats_on_empty_cache() {
    let cache = TempDir::new().unwrap();
    let output = run(buildsense(&cache.path().join("fresh")).args(["cache", "stats", "--format", "json"]));

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json = stdout_json(&output);
    assert_eq!(json["entries"], 0);
    assert_eq!(json["total_bytes"], 0);
}

#[test]
fn test_cache_clear() {
    let cache = TempDir::new().unwrap();
    let output = run(buildsense(cache.path()).args(["cache", "clear"]));

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Cleared cache"));
}

#[cfg(unix)]
fn build_cmd(cache_dir: &Path, proj: &Path, script: &str) -> Command {
    let mut cmd = buildsense(cache_dir);
    cmd.args(["build", "--format", "json", "--engine", "sh"])
        .args(["--engine-arg", "-c", "--engine-arg", script])
        .arg(proj);
    cmd
}

#[cfg(unix)]
#[test]
fn test_build_then_cache_hit() {
    let cache = TempDir::new().unwrap();
    let proj = project(support::SVELTE_LIBRARY);
    let script = "cat > /dev/null; echo dist/index.js";

    let first = run(&mut build_cmd(cache.path(), proj.path(), script));
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    let first = stdout_json(&first);
    assert_eq!(first["success"], true);
    assert_eq!(first["cacheHit"], false);
    assert_eq!(first["outputs"][0], "dist/index.js");

    let second = stdout_json(&run(&mut build_cmd(cache.path(), proj.path(), script)));
    assert_eq!(second["cacheHit"], true);
    assert_eq!(second["outputs"][0], "dist/index.js");

    let stats = stdout_json(&run(buildsense(cache.path()).args(["cache", "stats", "--format", "json"])));
    assert_eq!(stats["entries"], 1);
}

#[cfg(unix)]
#[test]
fn test_build_no_cache_skips_cache() {
    let cache = TempDir::new().unwrap();
    let proj = project(support::SVELTE_LIBRARY);
    let script = "cat > /dev/null; echo dist/index.js";

    for _ in 0..2 {
        let output = run(build_cmd(cache.path(), proj.path(), script).arg("--no-cache"));
        assert_eq!(stdout_json(&output)["cacheHit"], false);
    }
}

#[cfg(unix)]
#[test]
fn test_build_engine_failure_exits_nonzero() {
    let cache = TempDir::new().unwrap();
    let proj = project(support::REACT_LIBRARY);
    let output = run(&mut build_cmd(
        cache.path(),
        proj.path(),
        "cat > /dev/null; echo 'bundle failed' >&2; exit 3",
    ));

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["success"], false);
    assert!(json["errors"][0].as_str().unwrap().contains("bundle failed"));
}

#[test]
fn test_build_requires_engine() {
    let cache = TempDir::new().unwrap();
    let output = run(buildsense(cache.path()).arg("build"));
    assert!(!output.status.success());
}
