use crate::config::JobConfig;
use crate::error::JobError;
use crate::job::{self, JobDescriptor};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Outcome counters reported by a host engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub records_read: u64,
    pub pairs_mapped: u64,
    pub pairs_reduced: u64,
    pub elapsed: Duration,
}

/// The external engine a job runs on.
///
/// The engine owns scheduling, partitioning and task retry; this layer
/// hands it a descriptor and blocks until completion.
#[async_trait]
pub trait HostEngine: Send + Sync {
    async fn run(&self, job: &JobDescriptor) -> Result<JobSummary, JobError>;
}

/// Builds a default job from `base`, lets `configure` customize the
/// descriptor, applies the replace policy, and runs the job to completion.
pub async fn run_job<E, F>(engine: &E, base: JobConfig, configure: F) -> Result<JobSummary, JobError>
where
    E: HostEngine,
    F: FnOnce(&mut JobDescriptor),
{
    let mut job = job::build_default_job(base);
    configure(&mut job);
    job::apply_replace_policy(&job)?;
    info!(name = %job.name, "starting job");
    let summary = engine.run(&job).await?;
    info!(
        records = summary.records_read,
        mapped = summary.pairs_mapped,
        reduced = summary.pairs_reduced,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "job finished"
    );
    Ok(summary)
}

/// Tool-style entry point: builds a default job from `base`, applies
/// command-line overrides (`args` is the full argv), and runs to
/// completion. Returns the process exit status: 0 on success, 1 otherwise.
/// Malformed arguments print the parse error and usage text to stderr
/// before any work starts.
pub async fn run_as_tool<E: HostEngine>(
    engine: &E,
    base: JobConfig,
    args: impl IntoIterator<Item = String>,
) -> i32 {
    let mut job = job::build_default_job(base);
    if let Err(e) = job::parse_overrides(&mut job, args) {
        eprintln!("{}", e);
        return 1;
    }
    if let Err(e) = job::apply_replace_policy(&job) {
        eprintln!("{}", e);
        return 1;
    }
    info!(name = %job.name, "starting job");
    match engine.run(&job).await {
        Ok(summary) => {
            info!(
                records = summary.records_read,
                mapped = summary.pairs_mapped,
                reduced = summary.pairs_reduced,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "job finished"
            );
            0
        }
        Err(e) => {
            eprintln!("job failed: {}", e);
            1
        }
    }
}
