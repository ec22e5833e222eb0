//! Slurm submit policy
//!
//! Runs a site's job submission policy, written as a Rhai script, against
//! every job descriptor the scheduler receives. The descriptor is handed to
//! the script as a mapping; whatever keys the script leaves in place are
//! read back into the record once it accepts the job.
//!
//! # Example
//!
//! ```rhai
//! fn job_submit(job_desc, submit_uid) {
//!     if job_desc.time_limit == () {
//!         slurm::user_msg("please set a time limit");
//!         return 1;
//!     }
//!     0
//! }
//! ```
//!
//! # Crate Features
//!
//! - `debug`: trace every hook call with its thread id

#![warn(rust_2018_idioms)]

pub mod embedded;
pub mod error;
pub mod marshal;
pub mod plugin;
pub mod record;
pub mod runtime;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use embedded::{HookStatus, PolicyHost, PolicyOutcome, PolicyRuntime, RhaiRuntime};
pub use error::{FieldConversionError, PolicyError, PolicyResult};
pub use plugin::JobSubmitPlugin;
pub use record::JobRecord;

use std::fs;
use std::path::Path;

use tracing::debug;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "slurm-submit-policy";

/// Read a job descriptor from a JSON file. Missing fields are unset.
pub fn load_record(path: &Path) -> Result<JobRecord> {
    debug!("reading job descriptor {}", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read job descriptor: {}", path.display()))?;
    let record = serde_json::from_str(&content)
        .with_context(|| format!("Invalid job descriptor: {}", path.display()))?;
    Ok(record)
}
