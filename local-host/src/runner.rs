use crate::shuffle;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use mapbind_core::driver::{HostEngine, JobSummary};
use mapbind_core::error::JobError;
use mapbind_core::job::{JobDescriptor, RecordFormat};
use mapbind_core::worker::{CombineWorker, MapWorker, ReduceWorker};
use mapbind_core::{JobConfig, MemorySink};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Number of records per map task.
pub const PARTITION_SIZE_KEY: &str = "mapbind.host.partition_size";
/// Number of reduce tasks.
pub const NUM_REDUCERS_KEY: &str = "mapbind.host.num_reducers";

const DEFAULT_PARTITION_SIZE: usize = 1000;
const DEFAULT_NUM_REDUCERS: usize = 4;

/// In-process host engine.
///
/// Satisfies the worker lifecycle contract the binding layer targets:
/// every worker is constructed with no arguments, configured once with the
/// distributed job configuration, then fed records by a single task loop.
/// Task retry is deliberately absent; a failed task fails the run.
pub struct LocalHost {
    cancel: CancellationToken,
}

impl LocalHost {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
        }
    }

    /// Token that cancels the run between records when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostEngine for LocalHost {
    async fn run(&self, job: &JobDescriptor) -> Result<JobSummary, JobError> {
        let started = Instant::now();
        let records = read_input(job)?;
        let records_read = records.len() as u64;
        info!(records = records_read, name = %job.name, "input loaded");

        let partition_size = config_usize(&job.config, PARTITION_SIZE_KEY, DEFAULT_PARTITION_SIZE);
        let num_reducers = config_usize(&job.config, NUM_REDUCERS_KEY, DEFAULT_NUM_REDUCERS);
        let combine = job.workers.combiner.is_some();

        // Map phase: one task per partition, each owning one MapWorker.
        let mut map_tasks: Vec<JoinHandle<Result<(u64, Vec<(String, String)>), JobError>>> =
            Vec::new();
        for chunk in records.chunks(partition_size.max(1)) {
            let chunk = chunk.to_vec();
            let config = job.config.clone();
            let cancel = self.cancel.clone();
            map_tasks.push(tokio::spawn(async move {
                run_map_task(chunk, &config, combine, &cancel)
            }));
        }

        let mut pairs_mapped = 0u64;
        let mut intermediate: Vec<(String, String)> = Vec::new();
        for task in map_tasks {
            let (emitted, pairs) = task.await.map_err(join_failure)??;
            pairs_mapped += emitted;
            intermediate.extend(pairs);
        }
        debug!(pairs = intermediate.len(), "map phase complete");

        // Shuffle: sort and group the intermediate pairs by key.
        let grouped = shuffle::group(intermediate);

        // Reduce phase: contiguous key ranges, one task per reducer.
        let per_reducer = grouped
            .len()
            .div_ceil(num_reducers.max(1))
            .max(1);
        let mut reduce_tasks: Vec<JoinHandle<Result<Vec<(String, String)>, JobError>>> = Vec::new();
        for range in grouped.chunks(per_reducer) {
            let range = range.to_vec();
            let config = job.config.clone();
            let cancel = self.cancel.clone();
            reduce_tasks.push(tokio::spawn(
                async move { run_reduce_task(range, &config, &cancel) },
            ));
        }

        fs::create_dir_all(&job.output_path).map_err(|e| JobError::Output {
            path: job.output_path.display().to_string(),
            source: e,
        })?;

        let mut pairs_reduced = 0u64;
        for (index, task) in reduce_tasks.into_iter().enumerate() {
            let pairs = task.await.map_err(join_failure)??;
            pairs_reduced += pairs.len() as u64;
            write_part(job, index, &pairs)?;
        }
        debug!(pairs = pairs_reduced, "reduce phase complete");

        Ok(JobSummary {
            records_read,
            pairs_mapped,
            pairs_reduced,
            elapsed: started.elapsed(),
        })
    }
}

fn join_failure(e: tokio::task::JoinError) -> JobError {
    JobError::Engine(format!("worker task panicked: {}", e))
}

fn config_usize(config: &JobConfig, key: &str, default: usize) -> usize {
    config
        .get_nonempty(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn run_map_task(
    chunk: Vec<(String, String)>,
    config: &JobConfig,
    combine: bool,
    cancel: &CancellationToken,
) -> Result<(u64, Vec<(String, String)>), JobError> {
    let mut worker = MapWorker::default();
    worker.configure(config)?;

    let mut sink = MemorySink::new();
    for (key, value) in &chunk {
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        worker.map(&mut sink, key, value)?;
    }
    let pairs = sink.into_pairs();
    let emitted = pairs.len() as u64;

    let pairs = if combine {
        run_combine_pass(pairs, config, cancel)?
    } else {
        pairs
    };
    Ok((emitted, pairs))
}

// Local combine pass over one map task's output, before the shuffle.
fn run_combine_pass(
    pairs: Vec<(String, String)>,
    config: &JobConfig,
    cancel: &CancellationToken,
) -> Result<Vec<(String, String)>, JobError> {
    let mut worker = CombineWorker::default();
    worker.configure(config)?;

    let mut sink = MemorySink::new();
    for (key, values) in shuffle::group(pairs) {
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        let mut values = values.into_iter();
        worker.combine(&mut sink, &key, &mut values)?;
    }
    Ok(sink.into_pairs())
}

fn run_reduce_task(
    range: Vec<(String, Vec<String>)>,
    config: &JobConfig,
    cancel: &CancellationToken,
) -> Result<Vec<(String, String)>, JobError> {
    let mut worker = ReduceWorker::default();
    worker.configure(config)?;

    let mut sink = MemorySink::new();
    for (key, values) in range {
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        let mut values = values.into_iter();
        worker.reduce(&mut sink, &key, &mut values)?;
    }
    Ok(sink.into_pairs())
}

fn read_input(job: &JobDescriptor) -> Result<Vec<(String, String)>, JobError> {
    if job.input_paths.is_empty() {
        return Err(JobError::Usage(
            "at least one input path is required".to_string(),
        ));
    }
    let mut records = Vec::new();
    for path in &job.input_paths {
        for file in expand(path)? {
            let text = fs::read_to_string(&file).map_err(|e| JobError::Input {
                path: file.display().to_string(),
                source: e,
            })?;
            let mut offset = 0usize;
            for line in text.lines() {
                match job.input_format {
                    RecordFormat::TextLine => {
                        records.push((offset.to_string(), line.to_string()));
                    }
                    RecordFormat::TextKeyValue => {
                        let (key, value) = line.split_once('\t').unwrap_or((line, ""));
                        records.push((key.to_string(), value.to_string()));
                    }
                }
                offset += line.len() + 1;
            }
        }
    }
    Ok(records)
}

// A directory input means all regular files directly inside it, in name
// order, so repeated runs see records in the same order.
fn expand(path: &Path) -> Result<Vec<PathBuf>, JobError> {
    let input_failure = |e: std::io::Error| JobError::Input {
        path: path.display().to_string(),
        source: e,
    };
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(input_failure)? {
        let entry = entry.map_err(input_failure)?;
        if entry.file_type().map_err(input_failure)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

// Output parts follow the descriptor's output format: tab-separated
// key/value lines, or bare value lines when the format carries no keys.
// Gzip-compressed when the descriptor asks for compression; gzip has no
// block notion, the block_compression flag only travels on the descriptor
// for hosts that do.
fn write_part(job: &JobDescriptor, index: usize, pairs: &[(String, String)]) -> Result<(), JobError> {
    let mut name = format!("part-{:05}", index);
    if job.compress_output {
        name.push_str(".gz");
    }
    let path = job.output_path.join(name);
    let output_failure = |e: std::io::Error| JobError::Output {
        path: path.display().to_string(),
        source: e,
    };

    let mut buf = Vec::new();
    for (key, value) in pairs {
        match job.output_format {
            RecordFormat::TextKeyValue => {
                writeln!(buf, "{}\t{}", key, value).map_err(output_failure)?
            }
            RecordFormat::TextLine => writeln!(buf, "{}", value).map_err(output_failure)?,
        }
    }

    let mut file = File::create(&path).map_err(output_failure)?;
    if job.compress_output {
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&buf).map_err(output_failure)?;
        encoder.finish().map_err(output_failure)?;
    } else {
        file.write_all(&buf).map_err(output_failure)?;
    }
    Ok(())
}
