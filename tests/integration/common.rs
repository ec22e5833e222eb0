//! Shared helpers: policy directories in temp dirs

use std::fs;

use slurm_submit_policy::PolicyHost;
use tempfile::TempDir;

/// A script directory holding `job_submit.rhai` plus any extra modules
pub struct PolicyDir {
    pub dir: TempDir,
}

impl PolicyDir {
    pub fn new(policy: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("job_submit.rhai"), policy).unwrap();
        PolicyDir { dir }
    }

    pub fn empty() -> Self {
        PolicyDir {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn with_module(
        self,
        name: &str,
        source: &str,
    ) -> Self {
        fs::write(self.dir.path().join(format!("{}.rhai", name)), source).unwrap();
        self
    }

    pub fn host(&self) -> PolicyHost {
        PolicyHost::new(self.dir.path())
    }
}
