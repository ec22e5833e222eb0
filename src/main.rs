//! Slurm submit policy - development CLI
//!
//! Drives the same lifecycle the scheduler does, against a job descriptor
//! read from JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use slurm_submit_policy::record::FIELDS;
use slurm_submit_policy::util::{config, logger, logger::LogLevel};
use slurm_submit_policy::{load_record, JobSubmitPlugin, PolicyHost, NAME, VERSION};

/// Run a job submit policy script outside the scheduler
#[derive(Parser, Debug)]
#[command(name = "slurm-submit-policy")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Plugin configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding job_submit.rhai, overrides the configuration
    #[arg(long, global = true, value_name = "DIR")]
    script_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a job descriptor through the policy
    Run {
        /// Job descriptor (JSON)
        #[arg(long, value_name = "FILE")]
        record: PathBuf,

        /// Submitting user id
        #[arg(long, default_value_t = 0)]
        uid: u32,

        /// Number of submissions, each on a fresh copy of the descriptor
        #[arg(long, default_value_t = 1)]
        iterations: u32,
    },

    /// Load the policy and resolve its entry function
    Check,

    /// List the job descriptor fields visible to the policy
    Fields,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = args.script_dir {
        config.policy.script_dir = dir;
    }
    logger::init_with_level(if args.verbose {
        LogLevel::Debug
    } else {
        config.log.level
    });

    match args.command {
        Commands::Run {
            record,
            uid,
            iterations,
        } => {
            if iterations == 0 {
                bail!("--iterations must be at least 1");
            }
            let job = load_record(&record)?;
            let plugin = JobSubmitPlugin::init(&config);

            let mut last = None;
            for _ in 0..iterations {
                let mut job_desc = job.clone();
                let outcome = plugin.submit(&mut job_desc, uid);
                last = Some((outcome, job_desc));
            }
            plugin.fini();

            if let Some((outcome, job_desc)) = last {
                let report = serde_json::json!({
                    "status": outcome.status.code(),
                    "user_msg": outcome.user_msg,
                    "record": job_desc,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
                if !outcome.status.is_success() {
                    bail!("job rejected by policy");
                }
            }
        }
        Commands::Check => {
            let host = PolicyHost::new(config.script_dir());
            if let Err(err) = host.check() {
                if let Some(fault) = err.fault() {
                    eprintln!("{}", fault.trace_text());
                }
                return Err(err).context("Policy check failed");
            }
            eprintln!("Check passed!");
        }
        Commands::Fields => {
            for desc in FIELDS {
                println!("{:<24} {}", desc.name, desc.kind.describe());
            }
        }
    }

    Ok(())
}
