//! Command-line harness

use std::fs;
use std::process::{Command, Output};

use slurm_submit_policy::util::config::SCRIPT_DIR_ENV;

use crate::common::PolicyDir;

fn cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_slurm-submit-policy"))
        .args(args)
        .env_remove(SCRIPT_DIR_ENV)
        .output()
        .unwrap()
}

#[test]
fn test_fields() {
    let output = cli(&["fields"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 112);
    assert!(stdout.lines().any(|l| l.starts_with("environment") && l.ends_with("env")));
    assert!(stdout.lines().any(|l| l.starts_with("pn_min_memory") && l.ends_with("u64")));
}

#[test]
fn test_check() {
    let good = PolicyDir::new("fn job_submit(job_desc, submit_uid) { 0 }");
    let dir = good.dir.path().to_string_lossy().to_string();
    assert!(cli(&["check", "--script-dir", &dir]).status.success());

    let bad = PolicyDir::new("fn other() { 0 }");
    let dir = bad.dir.path().to_string_lossy().to_string();
    let output = cli(&["check", "--script-dir", &dir]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("job_submit"));
}

#[test]
fn test_run() {
    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            job_desc.partition = "batch";
            slurm::user_msg("partition set");
            0
        }
        "#,
    );
    let record = policy.dir.path().join("job.json");
    fs::write(&record, r#"{"name": "sim", "environment": ["PATH=/bin"]}"#).unwrap();

    let dir = policy.dir.path().to_string_lossy().to_string();
    let record = record.to_string_lossy().to_string();
    let output = cli(&[
        "run",
        "--script-dir",
        &dir,
        "--record",
        &record,
        "--uid",
        "1000",
        "--iterations",
        "3",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], 0);
    assert_eq!(report["user_msg"], "partition set");
    assert_eq!(report["record"]["name"], "sim");
    assert_eq!(report["record"]["partition"], "batch");
    assert_eq!(report["record"]["environment"][0], "PATH=/bin");
}
