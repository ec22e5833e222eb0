//! Per-call runtime lifecycle
//!
//! `PolicyHost` is the explicit context owning the runtime, the staged
//! message slot and the lock guarding both. Each hook call takes the lock,
//! opens a `Session` and runs the policy; dropping the session tears the
//! runtime down and clears the message slot, so every exit path
//! (success, rejection, load failure, script fault) ends Uninitialized.

use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};
use tracing::{error, info};

use crate::embedded::{PolicyRuntime, RhaiRuntime, ENTRY_FUNCTION, POLICY_MODULE};
use crate::error::{PolicyError, PolicyResult};
use crate::plugin::PLUGIN_TYPE;
use crate::record::{self, JobRecord};
use crate::runtime::extfunc::MessageBridge;

/// Call-path tracing, compiled in with the `debug` feature
macro_rules! call_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug")]
        tracing::debug!(
            "{}: [{:?}] {}",
            PLUGIN_TYPE,
            std::thread::current().id(),
            format_args!($($arg)*)
        );
    };
}

/// Outcome visible to the host scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    Success,
    Error,
}

impl HookStatus {
    /// Host return code
    pub fn code(self) -> i32 {
        match self {
            HookStatus::Success => 0,
            HookStatus::Error => -1,
        }
    }

    pub fn is_success(self) -> bool {
        self == HookStatus::Success
    }
}

/// Status plus the message staged for the submitting user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub status: HookStatus,
    pub user_msg: Option<String>,
}

/// State guarded by the host lock
struct HostState<R> {
    runtime: R,
    bridge: MessageBridge,
}

/// One boot..shutdown span, holding the lock for its whole life
struct Session<'a, R: PolicyRuntime> {
    state: MutexGuard<'a, HostState<R>>,
}

impl<'a, R: PolicyRuntime> Session<'a, R> {
    fn open(
        state: MutexGuard<'a, HostState<R>>,
        script_dir: &Path,
    ) -> PolicyResult<Self> {
        let mut session = Session { state };
        let HostState { runtime, bridge } = &mut *session.state;
        runtime.boot(bridge, script_dir)?;
        Ok(session)
    }
}

impl<R: PolicyRuntime> Drop for Session<'_, R> {
    fn drop(&mut self) {
        self.state.runtime.shutdown();
        self.state.bridge.clear();
    }
}

/// Lock-serialized owner of the embedded runtime
pub struct PolicyHost<R: PolicyRuntime = RhaiRuntime> {
    state: Mutex<HostState<R>>,
    script_dir: PathBuf,
}

impl PolicyHost<RhaiRuntime> {
    /// Rhai host logging through `tracing`
    pub fn new(script_dir: impl Into<PathBuf>) -> Self {
        Self::with_runtime(RhaiRuntime::new(), MessageBridge::default(), script_dir)
    }
}

impl<R: PolicyRuntime> PolicyHost<R> {
    pub fn with_runtime(
        runtime: R,
        bridge: MessageBridge,
        script_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            state: Mutex::new(HostState { runtime, bridge }),
            script_dir: script_dir.into(),
        }
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    /// Run the policy against `record`.
    ///
    /// Failures are logged with their diagnostics and reported as
    /// `HookStatus::Error`. The staged message is returned on every path
    /// that reached the script call.
    pub fn submit(
        &self,
        record: &mut JobRecord,
        submit_uid: u32,
    ) -> PolicyOutcome {
        let mut user_msg = None;
        let status = match self.try_submit(record, submit_uid, &mut user_msg) {
            Ok(()) => HookStatus::Success,
            Err(err) => {
                log_failure(&err, user_msg.as_deref());
                HookStatus::Error
            }
        };
        PolicyOutcome { status, user_msg }
    }

    /// Run the policy, keeping the error taxonomy.
    ///
    /// `user_msg` receives the staged message once the script has been
    /// called, whether it accepted, rejected or faulted.
    pub fn try_submit(
        &self,
        record: &mut JobRecord,
        submit_uid: u32,
        user_msg: &mut Option<String>,
    ) -> PolicyResult<()> {
        call_trace!("submit: waiting for lock");
        let mut session = Session::open(self.state.lock(), &self.script_dir)?;
        call_trace!("submit: runtime booted");
        let HostState { runtime, bridge } = &mut *session.state;

        let mut script = runtime.load_policy_script(POLICY_MODULE)?;
        runtime.resolve_entry(&script, ENTRY_FUNCTION)?;

        let (mut job_desc, unconvertible) = record::encode_checked(record);
        let invoked = runtime.invoke(&mut script, ENTRY_FUNCTION, &mut job_desc, submit_uid);
        *user_msg = bridge.take_staged();
        let status = invoked?;
        call_trace!("submit: {} returned {}", ENTRY_FUNCTION, status);

        if status != 0 {
            return Err(PolicyError::Rejection { status });
        }
        record::decode_except(record, &mut job_desc, &unconvertible);
        Ok(())
    }

    /// Reserved hook for job modification; no translation is performed.
    pub fn modify(
        &self,
        _record: &mut JobRecord,
        _existing: &JobRecord,
        _submit_uid: u32,
    ) -> HookStatus {
        let _state = self.state.lock();
        call_trace!("modify: nothing to do");
        HookStatus::Success
    }

    /// Boot, load the policy and resolve its entry function, then tear down.
    pub fn check(&self) -> PolicyResult<()> {
        let mut session = Session::open(self.state.lock(), &self.script_dir)?;
        let runtime = &mut session.state.runtime;
        let script = runtime.load_policy_script(POLICY_MODULE)?;
        runtime.resolve_entry(&script, ENTRY_FUNCTION)?;
        Ok(())
    }

    /// Whether the runtime is currently booted. Waits for the lock, so this
    /// is always false between calls.
    pub fn is_running(&self) -> bool {
        self.state.lock().runtime.is_running()
    }
}

/// Log a failed call: script trace, then `kind: message`, then the
/// message staged for the user
fn log_failure(
    err: &PolicyError,
    user_msg: Option<&str>,
) {
    if let Some(fault) = err.fault() {
        if !fault.trace.is_empty() {
            error!("{}: {}", PLUGIN_TYPE, fault.trace_text());
        }
    }
    error!("{}: {}", PLUGIN_TYPE, err);
    if let Some(msg) = user_msg {
        info!("{}: user message: {}", PLUGIN_TYPE, msg);
    }
}
