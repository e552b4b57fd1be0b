use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Writes a configuration file pointing at a fake server.
fn write_config(dir: &TempDir, token: Option<&str>) -> std::path::PathBuf {
    let mut yaml = String::from("url: https://git.example.com\n");
    if let Some(token) = token {
        yaml.push_str(&format!("token: {token}\n"));
    }
    let path = dir.path().join("config.yml");
    fs::write(&path, yaml).expect("failed to write config");
    path
}

/// Runs `labctl` with an isolated environment.
fn labctl(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_labctl"))
        .args(args)
        .env("LABCTL_CONFIG", config)
        .env_remove("LABCTL_URL")
        .env_remove("LABCTL_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run labctl")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// Mapping failures
// ---------------------------------------------------------------------------

#[test]
fn missing_required_flag_fails_without_request() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, None);

    let out = labctl(&config, &["project", "share", "-i", "7", "-a", "30"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty(), "no request should be printed");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("required flag --group_id was not provided"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn transform_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, None);

    let out = labctl(
        &config,
        &["project", "share", "-i", "7", "-g", "3", "-a", "99"],
    );

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown access level: 99"));
}

#[test]
fn user_get_needs_one_selector() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, None);

    let out = labctl(&config, &["user", "get"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("exactly one of --id or --username"));
}

#[test]
fn group_without_leaf_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, None);

    let out = labctl(&config, &["branches"]);

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}

// ---------------------------------------------------------------------------
// Prepared requests
// ---------------------------------------------------------------------------

#[test]
fn share_prints_prepared_request() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, Some("glpat-secret"));

    let out = labctl(
        &config,
        &[
            "project", "share", "-i", "group/app", "-g", "3", "-a", "40", "-e", "2016-09-26",
        ],
    );

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let response = stdout_json(&out);
    assert_eq!(response["method"], "POST");
    assert_eq!(
        response["url"],
        "https://git.example.com/api/v4/projects/group%2Fapp/share"
    );
    assert_eq!(response["body"]["group_access"], 40);
    assert_eq!(response["body"]["expires_at"], "2016-09-26");
    assert_eq!(response["authenticated"], true);
    assert!(!String::from_utf8_lossy(&out.stdout).contains("glpat-secret"));
}

#[test]
fn list_prints_query_parameters() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, None);

    let out = labctl(&config, &["project", "ls", "--archived=false", "--search", "cli"]);

    assert!(out.status.success());
    let response = stdout_json(&out);
    assert_eq!(response["method"], "GET");
    assert_eq!(
        response["url"],
        "https://git.example.com/api/v4/projects?archived=false&search=cli"
    );
    assert!(response.get("body").is_none());
}

#[test]
fn branch_alias_and_global_flags() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, None);

    let out = labctl(
        &config,
        &["-v", "branch", "protect", "-i", "7", "-b", "main", "--developers_can_merge=false"],
    );

    assert!(out.status.success());
    let response = stdout_json(&out);
    assert_eq!(response["method"], "PUT");
    assert_eq!(response["path"], "/projects/7/repository/branches/main/protect");
    assert_eq!(response["body"], serde_json::json!({"developers_can_merge": false}));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Prepared request"));
}

#[test]
fn explicit_config_flag_wins_over_environment() {
    let dir = TempDir::new().unwrap();
    let env_config = write_config(&dir, None);
    let other = dir.path().join("other.yml");
    fs::write(&other, "url: http://localhost:8080\n").unwrap();

    let out = labctl(
        &env_config,
        &["namespaces", "ls", "--config", other.to_str().unwrap()],
    );

    assert!(out.status.success());
    assert_eq!(
        stdout_json(&out)["url"],
        "http://localhost:8080/api/v4/namespaces"
    );
}

#[test]
fn unreadable_config_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.yml");

    let out = labctl(&missing, &["namespaces", "ls"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("I/O error"));
}

// ---------------------------------------------------------------------------
// Schema export
// ---------------------------------------------------------------------------

#[test]
fn schema_lists_every_leaf() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, None);

    let out = labctl(&config, &["schema"]);

    assert!(out.status.success());
    let descriptors = stdout_json(&out);
    let descriptors = descriptors.as_array().expect("schema should be an array");
    let share = descriptors
        .iter()
        .find(|d| d["command"] == "project share")
        .expect("project share should be described");

    let access = share["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "group_access")
        .unwrap();
    assert_eq!(access["transform"], "str2AccessLevel");
    assert_eq!(access["required"], true);
    assert_eq!(access["short"], "a");

    assert!(descriptors.iter().any(|d| d["command"] == "commits create"));
}
