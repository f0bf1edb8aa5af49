use crate::config::{self, JobConfig};
use crate::error::JobError;
use crate::phase::PhaseKind;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Worker class names the host engine recognizes and instantiates.
pub const MAP_WORKER_CLASS: &str = "mapbind.MapWorker";
pub const REDUCE_WORKER_CLASS: &str = "mapbind.ReduceWorker";
pub const COMBINE_WORKER_CLASS: &str = "mapbind.CombineWorker";

/// Record format the host reads or writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum RecordFormat {
    /// One value per line. On input the key is the line's byte offset;
    /// on output keys are dropped.
    #[default]
    TextLine,
    /// One record per line, key and value split at the first tab.
    TextKeyValue,
}

/// Host-recognized worker classes bound into a job. The combiner class is
/// present only when a combiner function identifier is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerClasses {
    pub map: String,
    pub reduce: String,
    pub combiner: Option<String>,
}

/// Everything the host engine needs to schedule and run one job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub name: String,
    pub input_paths: Vec<PathBuf>,
    pub output_path: PathBuf,
    pub input_format: RecordFormat,
    pub output_format: RecordFormat,
    pub output_key_type: String,
    pub output_value_type: String,
    pub compress_output: bool,
    pub block_compression: bool,
    pub workers: WorkerClasses,
    pub config: JobConfig,
}

/// Builds a job descriptor from a base configuration, applying the
/// standard defaults: line-oriented text input, key-value text output,
/// text key/value types, block-compressed output, and the worker-class
/// bindings (combiner only if a combiner function is configured).
pub fn build_default_job(base: JobConfig) -> JobDescriptor {
    let name = base
        .get_nonempty(&config::name_key())
        .unwrap_or("mapbind job")
        .to_string();
    let combiner = base
        .get_nonempty(&PhaseKind::Combiner.function_key())
        .map(|_| COMBINE_WORKER_CLASS.to_string());

    JobDescriptor {
        name,
        input_paths: Vec::new(),
        output_path: PathBuf::new(),
        input_format: RecordFormat::TextLine,
        output_format: RecordFormat::TextKeyValue,
        output_key_type: "text".to_string(),
        output_value_type: "text".to_string(),
        compress_output: true,
        block_compression: true,
        workers: WorkerClasses {
            map: MAP_WORKER_CLASS.to_string(),
            reduce: REDUCE_WORKER_CLASS.to_string(),
            combiner,
        },
        config: base,
    }
}

/// Deletes existing content at the job's output location when
/// `mapbind.job.replace` is the string `"true"`.
///
/// Destructive and irreversible; explicit opt-in only. Absent or any
/// other value leaves the output location untouched.
pub fn apply_replace_policy(job: &JobDescriptor) -> Result<(), JobError> {
    if !job.config.is_true(&config::replace_key()) {
        return Ok(());
    }
    match std::fs::remove_dir_all(&job.output_path) {
        Ok(()) => {
            info!(path = %job.output_path.display(), "removed existing job output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(JobError::Output {
            path: job.output_path.display().to_string(),
            source: e,
        }),
    }
}

/// Command-line overrides applied onto a job descriptor.
#[derive(Debug, Parser)]
#[command(name = "mapbind", about = "Run a configured map-reduce job")]
pub struct JobOverrides {
    /// Input path; repeatable
    #[arg(long = "input", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Output path
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Job display name
    #[arg(long)]
    pub name: Option<String>,

    /// Input record format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub input_format: Option<RecordFormat>,

    /// Output record format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub output_format: Option<RecordFormat>,

    /// Map function identifier
    #[arg(long, value_name = "ID")]
    pub map: Option<String>,

    /// Reduce function identifier
    #[arg(long, value_name = "ID")]
    pub reduce: Option<String>,

    /// Combiner function identifier
    #[arg(long, value_name = "ID")]
    pub combiner: Option<String>,

    /// Input-adapter identifier for a phase
    #[arg(long = "reader", value_name = "PHASE=ID")]
    pub readers: Vec<String>,

    /// Output-adapter identifier for a phase
    #[arg(long = "writer", value_name = "PHASE=ID")]
    pub writers: Vec<String>,

    /// Delete existing output before running
    #[arg(long)]
    pub replace: bool,

    /// Disable output compression
    #[arg(long)]
    pub no_compress: bool,

    /// Arbitrary configuration override; repeatable
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub sets: Vec<String>,
}

/// Parses command-line overrides and applies them onto `job`.
///
/// `args` is the full argv including the program name. Malformed input
/// yields `JobError::Usage` carrying clap's error and usage text; callers
/// turn that into a non-zero exit before any distributed work starts.
pub fn parse_overrides(
    job: &mut JobDescriptor,
    args: impl IntoIterator<Item = String>,
) -> Result<(), JobError> {
    let overrides = JobOverrides::try_parse_from(args).map_err(|e| JobError::Usage(e.to_string()))?;

    job.input_paths.extend(overrides.inputs);
    if let Some(output) = overrides.output {
        job.output_path = output;
    }
    if let Some(name) = overrides.name {
        job.config.set(config::name_key(), name.clone());
        job.name = name;
    }
    if let Some(format) = overrides.input_format {
        job.input_format = format;
    }
    if let Some(format) = overrides.output_format {
        job.output_format = format;
    }
    if let Some(map) = overrides.map {
        job.config.set(PhaseKind::Map.function_key(), map);
    }
    if let Some(reduce) = overrides.reduce {
        job.config.set(PhaseKind::Reduce.function_key(), reduce);
    }
    if let Some(combiner) = overrides.combiner {
        job.config.set(PhaseKind::Combiner.function_key(), combiner);
    }
    for spec in overrides.readers {
        let (phase, identifier) = split_phase_spec(&spec, "--reader")?;
        job.config.set(phase.reader_key(), identifier);
    }
    for spec in overrides.writers {
        let (phase, identifier) = split_phase_spec(&spec, "--writer")?;
        job.config.set(phase.writer_key(), identifier);
    }
    if overrides.replace {
        job.config.set(config::replace_key(), "true");
    }
    if overrides.no_compress {
        job.compress_output = false;
        job.block_compression = false;
    }
    for spec in overrides.sets {
        let (key, value) = spec.split_once('=').ok_or_else(|| {
            JobError::Usage(format!("--set expects KEY=VALUE, got '{}'", spec))
        })?;
        job.config.set(key, value);
    }

    // Overrides may have introduced or removed the combiner function, so
    // re-derive the conditional worker class.
    job.workers.combiner = job
        .config
        .get_nonempty(&PhaseKind::Combiner.function_key())
        .map(|_| COMBINE_WORKER_CLASS.to_string());

    Ok(())
}

fn split_phase_spec(spec: &str, flag: &str) -> Result<(PhaseKind, String), JobError> {
    let (phase, identifier) = spec
        .split_once('=')
        .ok_or_else(|| JobError::Usage(format!("{} expects PHASE=ID, got '{}'", flag, spec)))?;
    let phase = PhaseKind::from_str(phase).map_err(JobError::Usage)?;
    Ok((phase, identifier.to_string()))
}
