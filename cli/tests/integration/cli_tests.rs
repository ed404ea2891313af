//! Integration tests for the `enable-ci` binary.
//!
//! Every test points `SHIFTCI_CONFIG` at a temp path so it never reads
//! `~/.shiftci/config.yaml`, and none of them gets far enough to open a
//! network connection.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.yaml")
    }

    fn write_config(&self, yaml: &str) {
        std::fs::write(self.config_path(), yaml).expect("write config");
    }

    /// Creates `name` under the sandbox with the requested markers.
    fn project(&self, name: &str, pom: bool, git: bool) -> PathBuf {
        let root = self.dir.path().join(name);
        std::fs::create_dir_all(&root).expect("project dir");
        if pom {
            std::fs::write(root.join("pom.xml"), "<project/>").expect("pom");
        }
        if git {
            std::fs::create_dir_all(root.join(".git")).expect(".git");
        }
        root
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("enable-ci"));
        cmd.env("NO_COLOR", "1")
            .env("SHIFTCI_CONFIG", self.config_path())
            .env("CI", "1")
            .env_remove("OPENSHIFT_PASSWORD")
            .env_remove("LIBRA_SERVER");
        cmd
    }

    fn enable(&self, project: &Path) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("-p").arg(project).args(["-u", "dev@example.com"]);
        cmd
    }
}

// --- Help and argument parsing ---

#[test]
fn test_help_lists_flags() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--project"))
        .stdout(predicate::str::contains("--user"))
        .stdout(predicate::str::contains("--skip-ssh-key"));
}

#[test]
fn test_version_flag_shows_name() {
    Sandbox::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("enable-ci"));
}

#[test]
fn test_missing_required_args_is_a_validation_error() {
    Sandbox::new()
        .cmd()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("--project"))
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Exiting..."));
}

#[test]
fn test_missing_user_is_a_validation_error() {
    Sandbox::new()
        .cmd()
        .args(["-p", "/tmp"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("--user"))
        .stdout(predicate::str::contains("Exiting..."))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_unknown_flag_as_json_error() {
    let output = Sandbox::new()
        .cmd()
        .args(["--json", "--bogus"])
        .output()
        .expect("run enable-ci");
    assert_eq!(output.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["code"], "validation");
    assert!(v["message"].as_str().expect("message").contains("--bogus"));
}

#[test]
fn test_no_color_env_is_accepted() {
    let sandbox = Sandbox::new();
    let project = sandbox.project("shop", false, true);
    for value in ["1", "true", ""] {
        sandbox
            .enable(&project)
            .env("NO_COLOR", value)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("is not a maven project"));
    }
}

#[test]
fn test_no_color_flag_is_accepted() {
    let sandbox = Sandbox::new();
    let project = sandbox.project("shop", false, true);
    sandbox
        .enable(&project)
        .env_remove("NO_COLOR")
        .arg("--no-color")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("is not a maven project"));
}

// --- Project validation ---

#[test]
fn test_missing_directory_exits_one_with_usage() {
    let sandbox = Sandbox::new();
    let missing = sandbox.dir.path().join("nope");
    sandbox
        .enable(&missing)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Could not find directory"))
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Exiting..."));
}

#[test]
fn test_directory_without_pom_is_rejected() {
    let sandbox = Sandbox::new();
    let project = sandbox.project("shop", false, true);
    sandbox
        .enable(&project)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("is not a maven project"));
}

#[test]
fn test_directory_without_git_is_rejected() {
    let sandbox = Sandbox::new();
    let project = sandbox.project("shop", true, false);
    sandbox
        .enable(&project)
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "is not committed to a git repository",
        ));
}

#[test]
fn test_illegal_project_name_is_rejected() {
    let sandbox = Sandbox::new();
    let project = sandbox.project("my-shop", true, true);
    sandbox
        .enable(&project)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("'my-shop' is not a valid OpenShift name"));
}

#[test]
fn test_parent_segments_in_project_path_are_resolved() {
    let sandbox = Sandbox::new();
    let project = sandbox.project("shop", true, true);
    sandbox
        .enable(&project.join(".git").join(".."))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No password given"));
}

// --- Password ---

#[test]
fn test_missing_password_without_terminal_is_rejected() {
    let sandbox = Sandbox::new();
    let project = sandbox.project("shop", true, true);
    sandbox
        .enable(&project)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No password given"))
        .stdout(predicate::str::contains("Exiting..."));
}

// --- Configuration ---

#[test]
fn test_invalid_configured_domain_is_rejected() {
    let sandbox = Sandbox::new();
    sandbox.write_config("domain: my_domain\n");
    let project = sandbox.project("shop", true, true);
    sandbox
        .enable(&project)
        .arg("--password")
        .arg("secret")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("'my_domain' is not a valid OpenShift name"));
}

#[test]
fn test_unparseable_config_is_reported() {
    let sandbox = Sandbox::new();
    sandbox.write_config("readiness_timeout_secs: soon\n");
    let project = sandbox.project("shop", true, true);
    sandbox
        .enable(&project)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("cannot parse"))
        .stdout(predicate::str::contains("Usage:").not());
}

// --- JSON output ---

#[test]
fn test_json_error_object() {
    let sandbox = Sandbox::new();
    let project = sandbox.project("shop", false, false);
    let output = sandbox
        .enable(&project)
        .arg("--json")
        .output()
        .expect("run enable-ci");
    assert_eq!(output.status.code(), Some(1));

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(v["error"], true);
    assert_eq!(v["code"], "validation");
    assert!(
        v["message"]
            .as_str()
            .expect("message")
            .ends_with("is not a maven project")
    );
}
