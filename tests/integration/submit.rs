//! Submissions through the Rhai runtime

use slurm_submit_policy::marshal::sentinel::{NO_VAL, NO_VAL16};
use slurm_submit_policy::{HookStatus, JobRecord};

use crate::common::PolicyDir;

#[test]
fn test_end_to_end_edit() {
    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            job_desc.name = "x";
            job_desc.environment["EXTRA"] = "1";
            0
        }
        "#,
    );
    let mut record = JobRecord {
        environment: vec!["PATH=/bin".to_string()],
        ..JobRecord::default()
    };

    let outcome = policy.host().submit(&mut record, 1000);
    assert_eq!(outcome.status, HookStatus::Success);
    assert_eq!(outcome.user_msg, None);
    assert_eq!(record.name.as_deref(), Some("x"));
    assert_eq!(record.priority, NO_VAL);
    assert_eq!(record.environment, vec!["PATH=/bin", "EXTRA=1"]);
    assert_eq!(record.env_size(), 2);
}

#[test]
fn test_accept_without_edits_keeps_record() {
    let policy = PolicyDir::new("fn job_submit(job_desc, submit_uid) { 0 }");
    let mut record = JobRecord {
        name: Some("sim".to_string()),
        account: Some("physics".to_string()),
        time_limit: 60,
        nice: 10,
        requeue: 0,
        begin_time: 1_700_000_000,
        pn_min_memory: 0x8000_0000_0000_0400,
        argv: vec!["sim".to_string(), "-n".to_string(), "4".to_string()],
        environment: vec!["B=2".to_string(), "A=1".to_string()],
        ..JobRecord::default()
    };
    let before = record.clone();

    let outcome = policy.host().submit(&mut record, 1);
    assert!(outcome.status.is_success());
    assert_eq!(record, before);
}

#[test]
fn test_delete_clear_and_assign() {
    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            job_desc.remove("name");
            job_desc.account = ();
            job_desc.time_limit = 30;
            job_desc.requeue = false;
            job_desc.priority = "250";
            job_desc.comment = `submitted by ${submit_uid}`;
            job_desc.argv = [];
            0
        }
        "#,
    );
    let mut record = JobRecord {
        name: Some("keep".to_string()),
        account: Some("physics".to_string()),
        requeue: 1,
        argv: vec!["a.out".to_string()],
        ..JobRecord::default()
    };

    let outcome = policy.host().submit(&mut record, 42);
    assert!(outcome.status.is_success());
    assert_eq!(record.name.as_deref(), Some("keep"));
    assert_eq!(record.account, None);
    assert_eq!(record.time_limit, 30);
    assert_eq!(record.requeue, 0);
    assert_eq!(record.priority, 250);
    assert_eq!(record.comment.as_deref(), Some("submitted by 42"));
    assert!(record.argv.is_empty());
}

#[test]
fn test_unset_integer_is_unit() {
    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            if job_desc.core_spec == () {
                job_desc.comment = "core_spec unset";
            }
            job_desc.contiguous = true;
            0
        }
        "#,
    );
    let mut record = JobRecord::default();
    assert_eq!(record.core_spec, NO_VAL16);

    assert!(policy.host().submit(&mut record, 0).status.is_success());
    assert_eq!(record.comment.as_deref(), Some("core_spec unset"));
    assert_eq!(record.contiguous, 1);
    assert_eq!(record.core_spec, NO_VAL16);
}

#[test]
fn test_environment_edits() {
    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            job_desc.environment.remove("HOME");
            job_desc.environment["PATH"] = "/usr/bin:/bin";
            job_desc.environment["OMP_NUM_THREADS"] = 4;
            0
        }
        "#,
    );
    let mut record = JobRecord {
        environment: vec![
            "PATH=/bin".to_string(),
            "HOME=/home/u".to_string(),
            "LANG=C".to_string(),
        ],
        ..JobRecord::default()
    };

    assert!(policy.host().submit(&mut record, 0).status.is_success());
    assert_eq!(
        record.environment,
        vec!["PATH=/usr/bin:/bin", "LANG=C", "OMP_NUM_THREADS=4"]
    );
}

#[test]
fn test_unkeyable_environment_is_kept() {
    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            job_desc.comment = `environment is ${type_of(job_desc.environment)}`;
            0
        }
        "#,
    );
    let mut record = JobRecord {
        environment: vec!["PATH=/bin".to_string(), "BROKEN".to_string()],
        ..JobRecord::default()
    };

    assert!(policy.host().submit(&mut record, 0).status.is_success());
    assert_eq!(record.comment.as_deref(), Some("environment is ()"));
    assert_eq!(record.environment, vec!["PATH=/bin", "BROKEN"]);
}

#[test]
fn test_field_conversion_failure_does_not_reject() {
    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            job_desc.time_limit = [1, 2];
            job_desc.partition = #{ name: "gpu" };
            job_desc.qos = "normal";
            job_desc.not_a_field = 7;
            0
        }
        "#,
    );
    let mut record = JobRecord {
        time_limit: 90,
        partition: Some("cpu".to_string()),
        ..JobRecord::default()
    };

    let outcome = policy.host().submit(&mut record, 0);
    assert_eq!(outcome.status, HookStatus::Success);
    assert_eq!(record.time_limit, 90);
    assert_eq!(record.partition.as_deref(), Some("cpu"));
    assert_eq!(record.qos.as_deref(), Some("normal"));
}

#[test]
fn test_rejection_keeps_record_and_delivers_message() {
    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            job_desc.name = "should not stick";
            slurm::user_msg("time limit required");
            slurm::user_msg("see the site documentation");
            slurm::error("rejected job from " + submit_uid);
            2
        }
        "#,
    );
    let mut record = JobRecord::default();

    let outcome = policy.host().submit(&mut record, 7);
    assert_eq!(outcome.status, HookStatus::Error);
    assert_eq!(outcome.status.code(), -1);
    assert_eq!(
        outcome.user_msg.as_deref(),
        Some("time limit required\nsee the site documentation")
    );
    assert_eq!(record, JobRecord::default());
}

#[test]
fn test_import_from_script_dir() {
    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            import "defaults" as defaults;
            job_desc.partition = defaults::partition();
            slurm::info("applied site defaults");
            0
        }
        "#,
    )
    .with_module("defaults", r#"fn partition() { "batch" }"#);
    let mut record = JobRecord::default();

    assert!(policy.host().submit(&mut record, 0).status.is_success());
    assert_eq!(record.partition.as_deref(), Some("batch"));
}

#[test]
fn test_helper_functions_and_fresh_runtime_per_call() {
    let policy = PolicyDir::new(
        r#"
        fn limit(uid) {
            if uid == 0 { 600 } else { 120 }
        }
        fn job_submit(job_desc, submit_uid) {
            job_desc.time_limit = limit(submit_uid);
            0
        }
        "#,
    );
    let host = policy.host();
    for uid in [0, 1000, 0] {
        let mut record = JobRecord::default();
        assert!(host.submit(&mut record, uid).status.is_success());
        assert_eq!(record.time_limit, if uid == 0 { 600 } else { 120 });
        assert!(!host.is_running());
    }
}
