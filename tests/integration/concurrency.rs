//! Concurrent submissions against one host

use std::sync::Arc;
use std::thread;

use slurm_submit_policy::JobRecord;

use crate::common::PolicyDir;

#[test]
fn test_concurrent_submissions() {
    const THREADS: u32 = 4;
    const CALLS: u32 = 5;

    let policy = PolicyDir::new(
        r#"
        fn job_submit(job_desc, submit_uid) {
            job_desc.comment = `uid ${submit_uid}`;
            slurm::user_msg(`hello ${submit_uid}`);
            if submit_uid % 2 == 0 { 0 } else { 1 }
        }
        "#,
    );
    let host = Arc::new(policy.host());

    let handles: Vec<_> = (0..THREADS)
        .map(|uid| {
            let host = host.clone();
            thread::spawn(move || {
                for _ in 0..CALLS {
                    let mut record = JobRecord::default();
                    let outcome = host.submit(&mut record, uid);
                    assert_eq!(outcome.user_msg, Some(format!("hello {}", uid)));
                    if uid % 2 == 0 {
                        assert!(outcome.status.is_success());
                        assert_eq!(record.comment, Some(format!("uid {}", uid)));
                    } else {
                        assert!(!outcome.status.is_success());
                        assert_eq!(record.comment, None);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(!host.is_running());
}
