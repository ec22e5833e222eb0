//! Host-facing plugin entry points
//!
//! The scheduler loads the plugin once, calls `submit` for every job
//! submission (possibly from several workers at the same time) and `fini`
//! on unload.

use tracing::info;

use crate::embedded::{HookStatus, PolicyHost, PolicyOutcome, PolicyRuntime, RhaiRuntime};
use crate::record::JobRecord;
use crate::util::config::PluginConfig;

/// Human-readable plugin name
pub const PLUGIN_NAME: &str = "Job submit Rhai plugin";

/// Plugin type, also the prefix of every log line
pub const PLUGIN_TYPE: &str = "job_submit/rhai";

/// Plugin version
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Loaded submit-policy plugin
pub struct JobSubmitPlugin<R: PolicyRuntime = RhaiRuntime> {
    host: PolicyHost<R>,
}

impl JobSubmitPlugin<RhaiRuntime> {
    pub fn init(config: &PluginConfig) -> Self {
        let script_dir = config.script_dir();
        info!(
            "{}: {} {} loaded, policy directory {}",
            PLUGIN_TYPE,
            PLUGIN_NAME,
            PLUGIN_VERSION,
            script_dir.display()
        );
        Self::with_host(PolicyHost::new(script_dir))
    }
}

impl<R: PolicyRuntime> JobSubmitPlugin<R> {
    pub fn with_host(host: PolicyHost<R>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &PolicyHost<R> {
        &self.host
    }

    /// Submission hook
    pub fn submit(
        &self,
        job_desc: &mut JobRecord,
        submit_uid: u32,
    ) -> PolicyOutcome {
        self.host.submit(job_desc, submit_uid)
    }

    /// Modification hook
    pub fn modify(
        &self,
        job_desc: &mut JobRecord,
        job: &JobRecord,
        submit_uid: u32,
    ) -> HookStatus {
        self.host.modify(job_desc, job, submit_uid)
    }

    pub fn fini(self) {
        info!("{}: unloaded", PLUGIN_TYPE);
    }
}
