//! Load, entry and invocation failures

use slurm_submit_policy::{HookStatus, JobRecord, PolicyError};

use crate::common::PolicyDir;

fn try_submit(policy: &PolicyDir) -> (Result<(), PolicyError>, Option<String>, JobRecord) {
    let mut record = JobRecord::default();
    let mut user_msg = None;
    let result = policy.host().try_submit(&mut record, 500, &mut user_msg);
    (result, user_msg, record)
}

#[test]
fn test_missing_policy() {
    let policy = PolicyDir::empty();
    let (result, user_msg, _) = try_submit(&policy);
    match result {
        Err(PolicyError::ScriptLoad { module, .. }) => assert_eq!(module, "job_submit"),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(user_msg, None);
    assert_eq!(
        policy.host().submit(&mut JobRecord::default(), 0).status,
        HookStatus::Error
    );
}

#[test]
fn test_top_level_failure_is_a_load_error() {
    let policy = PolicyDir::new(
        r#"
        slurm::user_msg("never delivered");
        throw "bad configuration";
        fn job_submit(job_desc, submit_uid) { 0 }
        "#,
    );
    let host = policy.host();
    let (result, user_msg, _) = try_submit(&policy);
    let err = result.unwrap_err();
    assert!(matches!(err, PolicyError::ScriptLoad { .. }));
    assert!(err.to_string().contains("bad configuration"));
    assert_eq!(user_msg, None);

    // The message staged during the failed load is discarded.
    let ok = PolicyDir::new("fn job_submit(job_desc, submit_uid) { 0 }");
    assert_eq!(ok.host().submit(&mut JobRecord::default(), 0).user_msg, None);
    assert!(!host.is_running());
}

#[test]
fn test_missing_entry_function() {
    for source in [
        "fn submit(job_desc, submit_uid) { 0 }",
        "fn job_submit(job_desc) { 0 }",
        "let job_submit = 1;",
    ] {
        let policy = PolicyDir::new(source);
        let (result, _, _) = try_submit(&policy);
        match result {
            Err(PolicyError::EntryResolution { entry, .. }) => assert_eq!(entry, "job_submit"),
            other => panic!("{}: unexpected {:?}", source, other),
        }
    }
}

#[test]
fn test_script_exception_delivers_staged_message() {
    let policy = PolicyDir::new(
        r#"
        fn require_account(job_desc) {
            if job_desc.account == () {
                throw "account required";
            }
        }
        fn job_submit(job_desc, submit_uid) {
            job_desc.name = "changed";
            slurm::user_msg("checking account");
            require_account(job_desc);
            0
        }
        "#,
    );
    let (result, user_msg, record) = try_submit(&policy);
    let err = result.unwrap_err();
    let fault = err.fault().unwrap();
    assert_eq!(fault.kind, "RuntimeError");
    assert!(fault.message.contains("account required"));
    assert!(fault.trace_text().contains("require_account"));
    assert_eq!(user_msg.as_deref(), Some("checking account"));
    assert_eq!(record, JobRecord::default());
}

#[test]
fn test_bad_return_values() {
    for body in ["\"0\"", "0.0", "()", "job_desc.name = \"x\";"] {
        let policy = PolicyDir::new(&format!(
            "fn job_submit(job_desc, submit_uid) {{ {} }}",
            body
        ));
        let (result, _, record) = try_submit(&policy);
        match result {
            Err(PolicyError::Invocation { fault }) => assert_eq!(fault.kind, "TypeError", "{}", body),
            other => panic!("{}: unexpected {:?}", body, other),
        }
        assert_eq!(record, JobRecord::default());
    }
}

#[test]
fn test_non_zero_status() {
    let policy = PolicyDir::new("fn job_submit(job_desc, submit_uid) { -1 }");
    let (result, user_msg, _) = try_submit(&policy);
    assert!(matches!(result, Err(PolicyError::Rejection { status: -1 })));
    assert_eq!(user_msg, None);
}
