//! Integration tests for the varbuild CLI.
//!
//! These tests run the real binary against settings documents written to a
//! temporary directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::{TempDir, tempdir};

const THEME_ARCH: &str = r#"{ "theme": ["light", "dark"], "arch": ["x86", "arm"] }"#;

/// Get a command for the varbuild binary, run inside `dir` with a clean environment.
fn varbuild(dir: &Path) -> Command {
    let mut cmd = varbuild_with_colors(dir);
    cmd.arg("--no-color");
    cmd
}

/// Like [`varbuild`], but leaves color detection to the binary.
fn varbuild_with_colors(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("varbuild").unwrap();
    cmd.current_dir(dir)
        .env_remove("VARBUILD_SETTINGS")
        .env_remove("VARBUILD_PROGRAM")
        .env_remove("__VARBUILD_BUILD_OPTIONS")
        .env_remove("VARBUILD_BUILD_NAME")
        .env_remove("VARBUILD_LOG")
        .env_remove("RUST_LOG")
        .env_remove("NO_COLOR")
        .env_remove("FORCE_COLOR")
        .env_remove("CLICOLOR_FORCE");
    cmd
}

/// Temporary directory holding `.varbuild.json` with `contents`.
fn project(contents: &str) -> TempDir {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(".varbuild.json"), contents).unwrap();
    dir
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let dir = tempdir().unwrap();
    varbuild(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_displays() {
    let dir = tempdir().unwrap();
    varbuild(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("varbuild"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_help_mentions_options() {
    let dir = tempdir().unwrap();
    varbuild(dir.path())
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--program"))
        .stdout(predicate::str::contains("--kill-grace"))
        .stdout(predicate::str::contains("--no-pad"));
}

#[test]
fn test_invalid_option_value_is_usage_error() {
    let dir = tempdir().unwrap();
    varbuild(dir.path())
        .args(["run", "--kill-grace", "soon"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_top_level_flag_is_usage_error() {
    let dir = tempdir().unwrap();
    varbuild(dir.path())
        .args(["--no-such-flag", "list"])
        .assert()
        .code(2);
}

// ============================================================================
// List Command Tests
// ============================================================================

#[test]
fn test_list_plain() {
    let dir = project(THEME_ARCH);
    varbuild(dir.path())
        .args(["list", "--format", "plain"])
        .assert()
        .success()
        .stdout(
            "light-x86\ttheme=light\tarch=x86\n\
             light-arm\ttheme=light\tarch=arm\n\
             dark-x86\ttheme=dark\tarch=x86\n\
             dark-arm\ttheme=dark\tarch=arm\n",
        );
}

#[test]
fn test_list_table() {
    let dir = project(THEME_ARCH);
    varbuild(dir.path())
        .args(["list", "--ascii"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Variant"))
        .stdout(predicate::str::contains("dark-arm"));
}

#[test]
fn test_list_json() {
    let dir = project(r#"{ "theme": ["light"], "scale": [1, 2] }"#);
    let output = varbuild(dir.path())
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["name"], "light-1");
    assert_eq!(json[1]["options"]["scale"], 2);
}

#[test]
fn test_list_with_settings_flag() {
    let dir = tempdir().unwrap();
    let settings = dir.path().join("variants.json");
    std::fs::write(&settings, r#"{ "mode": ["dev", "prod"] }"#).unwrap();

    varbuild(dir.path())
        .args(["list", "--format", "plain", "--settings"])
        .arg(&settings)
        .assert()
        .success()
        .stdout(predicate::str::contains("prod\tmode=prod"));
}

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_show_without_orchestrator_lists_all() {
    let dir = project(THEME_ARCH);
    varbuild(dir.path())
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("light-x86"))
        .stdout(predicate::str::contains("dark-arm"));
}

#[test]
fn test_show_decodes_payload() {
    let dir = tempdir().unwrap();
    varbuild(dir.path())
        .arg("show")
        .env("__VARBUILD_BUILD_OPTIONS", "__v=1&__name=dark-arm&theme=dark&arch=arm")
        .assert()
        .success()
        .stdout("__name=dark-arm\ntheme=dark\narch=arm\n");
}

#[test]
fn test_show_rejects_malformed_payload() {
    let dir = tempdir().unwrap();
    varbuild(dir.path())
        .arg("show")
        .env("__VARBUILD_BUILD_OPTIONS", "__v=9&__name=x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported payload version"));
}

// ============================================================================
// Run Command Tests
// ============================================================================

#[test]
fn test_run_children_decode_their_own_variant() {
    let dir = project(THEME_ARCH);
    varbuild(dir.path())
        .args(["run", "--no-pad", "--program", env!("CARGO_BIN_EXE_varbuild")])
        .args(["--", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[light-x86] __name=light-x86"))
        .stdout(predicate::str::contains("[light-x86] theme=light"))
        .stdout(predicate::str::contains("[light-x86] arch=x86"))
        .stdout(predicate::str::contains("[dark-arm] __name=dark-arm"))
        .stdout(predicate::str::contains("[dark-arm] theme=dark"))
        .stdout(predicate::str::contains("[dark-arm] arch=arm"))
        .stderr(predicate::str::contains(
            "Parallel build completed successfully (4 variants)",
        ));
}

#[cfg(unix)]
#[test]
fn test_run_pads_prefixes() {
    let dir = project(r#"{ "theme": ["light", "dark"] }"#);
    varbuild(dir.path())
        .args(["run", "--program", "sh", "--", "-c", "echo \"$VARBUILD_BUILD_NAME\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("[light] light"))
        .stdout(predicate::str::contains("[dark ] dark"));
}

#[cfg(unix)]
#[test]
fn test_run_forwards_args_without_separator() {
    let dir = project(r#"{ "theme": ["light"] }"#);
    varbuild(dir.path())
        .args(["run", "--program", "sh", "-c", "echo \"built $VARBUILD_BUILD_NAME\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("[light] built light"));
}

#[cfg(unix)]
#[test]
fn test_run_forwards_stderr() {
    let dir = project(r#"{ "theme": ["light"] }"#);
    varbuild(dir.path())
        .args(["run", "--program", "sh", "--", "-c", "echo oops >&2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[light] oops"));
}

#[cfg(unix)]
#[test]
fn test_run_piped_output_has_no_color_codes() {
    let dir = project(r#"{ "theme": ["light", "dark"] }"#);
    let script = "echo out; echo err >&2; exit 1";
    let output = varbuild_with_colors(dir.path())
        .args(["run", "--program", "sh", "-c", script])
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("] out"));
    assert!(stderr.contains("] err"));
    assert!(stderr.contains("Parallel build failed"));
    assert!(!stdout.contains('\x1b'), "stdout has ANSI codes: {:?}", stdout);
    assert!(!stderr.contains('\x1b'), "stderr has ANSI codes: {:?}", stderr);
}

#[cfg(unix)]
#[test]
fn test_run_one_failure_kills_siblings() {
    let dir = project(THEME_ARCH);
    let script = r#"if [ "$VARBUILD_BUILD_NAME" = dark-arm ]; then exit 1; fi; sleep 30"#;
    varbuild(dir.path())
        .args(["run", "--program", "sh", "--", "-c", script])
        .timeout(std::time::Duration::from_secs(25))
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Parallel build failed: 1 failed, 3 killed",
        ))
        .stderr(predicate::str::contains("dark-arm: failed (exited with code 1)"));
}

#[cfg(unix)]
#[test]
fn test_run_exit_code_is_not_childs() {
    let dir = project(r#"{ "theme": ["light"] }"#);
    varbuild(dir.path())
        .args(["run", "--program", "sh", "--", "-c", "exit 42"])
        .assert()
        .code(1);
}

#[test]
fn test_run_missing_program_fails() {
    let dir = project(r#"{ "theme": ["light", "dark"] }"#);
    varbuild(dir.path())
        .args(["run", "--program", "varbuild-test-no-such-program"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not start"));
}

#[test]
fn test_run_missing_settings_launches_nothing() {
    let dir = tempdir().unwrap();
    let marker = dir.path().join("launched");
    varbuild(dir.path())
        .args(["run", "--program", "touch", "--"])
        .arg(&marker)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot read variant settings"));
    assert!(!marker.exists());
}

#[test]
fn test_run_malformed_settings() {
    let dir = project("{ not json");
    varbuild(dir.path())
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn test_run_rejects_reserved_axis() {
    let dir = project(r#"{ "__name": ["x"] }"#);
    varbuild(dir.path())
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("reserved"));
}

#[test]
fn test_run_rejects_empty_axis() {
    let dir = project(r#"{ "theme": ["light"], "arch": [] }"#);
    varbuild(dir.path())
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Axis 'arch' declares no values"));
}

#[test]
fn test_run_rejects_duplicate_axis_value() {
    let dir = project(r#"{ "mode": ["dev", "dev"] }"#);
    varbuild(dir.path())
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Axis 'mode' lists the value 'dev' more than once",
        ))
        .stderr(predicate::str::contains("separator").not());
}

#[test]
fn test_list_rejects_duplicate_axis_value() {
    let dir = project(r#"{ "mode": ["dev", "dev"] }"#);
    varbuild(dir.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("more than once"));
}

// ============================================================================
// Completions Tests
// ============================================================================

#[test]
fn test_completions_bash() {
    let dir = tempdir().unwrap();
    varbuild(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("varbuild"));
}
