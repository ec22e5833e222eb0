//! Embedded policy runtime
//!
//! Provides the per-call runtime lifecycle for policy scripts.
//! Key characteristics:
//! - One process-wide lock serializes every hook invocation
//! - The runtime is booted on entry and torn down on every exit path
//! - Nothing survives from one call to the next
//!
//! ```text
//! lock -> boot -> load policy -> resolve entry -> encode record
//!      -> invoke -> drain user message -> decode (status 0 only)
//!      -> shutdown -> unlock
//! ```

use std::path::Path;

use crate::error::PolicyResult;
use crate::record::DynamicRecord;
use crate::runtime::extfunc::MessageBridge;

pub mod lifecycle;
pub mod rhai_engine;

pub use lifecycle::{HookStatus, PolicyHost, PolicyOutcome};
pub use rhai_engine::RhaiRuntime;

/// Policy module name, resolved inside the script directory
pub const POLICY_MODULE: &str = "job_submit";

/// Entry function the policy module must define
pub const ENTRY_FUNCTION: &str = "job_submit";

/// Namespace the host functions are registered under
pub const HOST_NAMESPACE: &str = "slurm";

/// An embedded scripting runtime able to run the policy.
///
/// Implementations hold no state between `shutdown` and the next `boot`.
pub trait PolicyRuntime: Send {
    /// A loaded policy module
    type Script;

    fn is_running(&self) -> bool;

    /// Start the runtime, register the bridge under the host namespace and
    /// add `script_dir` to the module search path. Booting a running
    /// runtime is a no-op.
    fn boot(
        &mut self,
        bridge: &MessageBridge,
        script_dir: &Path,
    ) -> PolicyResult<()>;

    /// Import the policy module
    fn load_policy_script(
        &mut self,
        module: &str,
    ) -> PolicyResult<Self::Script>;

    /// Check the entry function exists and takes `(record, submit_uid)`
    fn resolve_entry(
        &self,
        script: &Self::Script,
        entry: &str,
    ) -> PolicyResult<()>;

    /// Call the entry function. In-place edits made by the script are
    /// written back into `record`.
    fn invoke(
        &mut self,
        script: &mut Self::Script,
        entry: &str,
        record: &mut DynamicRecord,
        submit_uid: u32,
    ) -> PolicyResult<i64>;

    /// Tear the runtime down
    fn shutdown(&mut self);
}

#[cfg(test)]
mod tests;
