use async_trait::async_trait;
use mapbind_core::driver::{self, HostEngine, JobSummary};
use mapbind_core::error::JobError;
use mapbind_core::job::{self, JobDescriptor, RecordFormat, COMBINE_WORKER_CLASS};
use mapbind_core::phase::PhaseKind;
use mapbind_core::{config, JobConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

fn args(list: &[&str]) -> Vec<String> {
    std::iter::once("mapbind")
        .chain(list.iter().copied())
        .map(String::from)
        .collect()
}

// ============================================================
// build_default_job
// ============================================================

#[test]
fn test_default_job_applies_standard_defaults() {
    let job = job::build_default_job(JobConfig::new());

    assert_eq!(job.name, "mapbind job");
    assert_eq!(job.input_format, RecordFormat::TextLine);
    assert_eq!(job.output_format, RecordFormat::TextKeyValue);
    assert_eq!(job.output_key_type, "text");
    assert_eq!(job.output_value_type, "text");
    assert!(job.compress_output, "output compression defaults to on");
    assert!(job.block_compression, "block compression defaults to on");
}

#[test]
fn test_combiner_class_is_bound_only_when_configured() {
    let without = job::build_default_job(JobConfig::new());
    assert!(
        without.workers.combiner.is_none(),
        "no combiner function, no combiner worker class"
    );

    let mut base = JobConfig::new();
    base.set(PhaseKind::Combiner.function_key(), "some/combiner");
    let with = job::build_default_job(base);
    assert_eq!(with.workers.combiner.as_deref(), Some(COMBINE_WORKER_CLASS));
}

#[test]
fn test_job_name_comes_from_configuration() {
    let mut base = JobConfig::new();
    base.set(config::name_key(), "nightly aggregation");
    let job = job::build_default_job(base);
    assert_eq!(job.name, "nightly aggregation");
}

// ============================================================
// apply_replace_policy
// ============================================================

#[test]
fn test_replace_true_deletes_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out");
    std::fs::create_dir(&output).unwrap();
    std::fs::write(output.join("stale"), "old data").unwrap();

    let mut base = JobConfig::new();
    base.set(config::replace_key(), "true");
    let mut job = job::build_default_job(base);
    job.output_path = output.clone();

    job::apply_replace_policy(&job).expect("replace should succeed");
    assert!(!output.exists(), "existing output must be removed");
}

#[test]
fn test_absent_replace_leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out");
    std::fs::create_dir(&output).unwrap();
    std::fs::write(output.join("keep"), "precious").unwrap();

    let mut job = job::build_default_job(JobConfig::new());
    job.output_path = output.clone();

    job::apply_replace_policy(&job).expect("policy check should succeed");
    assert!(
        output.join("keep").exists(),
        "pre-existing content must be left alone without explicit opt-in"
    );
}

#[test]
fn test_replace_on_missing_output_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut base = JobConfig::new();
    base.set(config::replace_key(), "true");
    let mut job = job::build_default_job(base);
    job.output_path = dir.path().join("never-created");

    job::apply_replace_policy(&job).expect("nothing to delete is fine");
}

// ============================================================
// parse_overrides
// ============================================================

#[test]
fn test_overrides_apply_paths_functions_and_flags() {
    let mut job = job::build_default_job(JobConfig::new());
    job::parse_overrides(
        &mut job,
        args(&[
            "--input", "/data/a",
            "--input", "/data/b",
            "--output", "/data/out",
            "--map", "wc/map",
            "--reduce", "wc/reduce",
            "--combiner", "wc/reduce",
            "--reader", "map=wc/reader",
            "--replace",
            "--no-compress",
            "--set", "mapbind.host.num_reducers=2",
        ]),
    )
    .expect("well-formed overrides must parse");

    assert_eq!(
        job.input_paths,
        vec![PathBuf::from("/data/a"), PathBuf::from("/data/b")]
    );
    assert_eq!(job.output_path, PathBuf::from("/data/out"));
    assert_eq!(
        job.config.get(&PhaseKind::Map.function_key()),
        Some("wc/map")
    );
    assert_eq!(
        job.config.get(&PhaseKind::Map.reader_key()),
        Some("wc/reader")
    );
    assert!(job.config.is_true(&config::replace_key()));
    assert!(!job.compress_output);
    assert_eq!(job.config.get("mapbind.host.num_reducers"), Some("2"));
    assert_eq!(
        job.workers.combiner.as_deref(),
        Some(COMBINE_WORKER_CLASS),
        "a combiner override must bind the combiner worker class"
    );
}

#[test]
fn test_format_overrides_apply_to_both_directions() {
    let mut job = job::build_default_job(JobConfig::new());
    job::parse_overrides(
        &mut job,
        args(&[
            "--input-format", "text-key-value",
            "--output-format", "text-line",
        ]),
    )
    .expect("well-formed format overrides must parse");

    assert_eq!(job.input_format, RecordFormat::TextKeyValue);
    assert_eq!(job.output_format, RecordFormat::TextLine);
}

#[test]
fn test_unknown_record_format_is_a_usage_error() {
    let mut job = job::build_default_job(JobConfig::new());
    let result = job::parse_overrides(&mut job, args(&["--input-format", "parquet"]));
    assert!(matches!(result, Err(JobError::Usage(_))));
}

#[test]
fn test_unknown_flag_is_a_usage_error() {
    let mut job = job::build_default_job(JobConfig::new());
    let result = job::parse_overrides(&mut job, args(&["--frobnicate"]));
    match result {
        Err(JobError::Usage(message)) => {
            assert!(
                message.contains("Usage") || message.contains("usage"),
                "usage text must accompany the parse error: {}",
                message
            );
        }
        other => panic!("expected a usage error, got {:?}", other.err()),
    }
}

#[test]
fn test_malformed_set_is_a_usage_error() {
    let mut job = job::build_default_job(JobConfig::new());
    let result = job::parse_overrides(&mut job, args(&["--set", "no-equals-sign"]));
    assert!(matches!(result, Err(JobError::Usage(_))));
}

#[test]
fn test_unknown_phase_in_reader_override_is_a_usage_error() {
    let mut job = job::build_default_job(JobConfig::new());
    let result = job::parse_overrides(&mut job, args(&["--reader", "shuffle=x/reader"]));
    assert!(matches!(result, Err(JobError::Usage(_))));
}

// ============================================================
// run_as_tool exit statuses
// ============================================================

#[derive(Default)]
struct RecordingEngine {
    runs: AtomicUsize,
}

#[async_trait]
impl HostEngine for RecordingEngine {
    async fn run(&self, _job: &JobDescriptor) -> Result<JobSummary, JobError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(JobSummary::default())
    }
}

struct FailingEngine;

#[async_trait]
impl HostEngine for FailingEngine {
    async fn run(&self, _job: &JobDescriptor) -> Result<JobSummary, JobError> {
        Err(JobError::Engine("simulated engine failure".to_string()))
    }
}

#[tokio::test]
async fn test_run_as_tool_returns_zero_on_success() {
    let engine = RecordingEngine::default();
    let status = driver::run_as_tool(&engine, JobConfig::new(), args(&[])).await;
    assert_eq!(status, 0);
    assert_eq!(engine.runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_as_tool_rejects_malformed_arguments_before_running() {
    let engine = RecordingEngine::default();
    let status = driver::run_as_tool(&engine, JobConfig::new(), args(&["--bogus"])).await;
    assert_eq!(status, 1, "command-line misuse must exit non-zero");
    assert_eq!(
        engine.runs.load(Ordering::SeqCst),
        0,
        "no work may start on misuse"
    );
}

#[tokio::test]
async fn test_run_as_tool_maps_engine_failure_to_nonzero_status() {
    let status = driver::run_as_tool(&FailingEngine, JobConfig::new(), args(&[])).await;
    assert_eq!(status, 1);
}

#[tokio::test]
async fn test_run_job_applies_the_configure_hook() {
    let engine = RecordingEngine::default();
    let summary = driver::run_job(&engine, JobConfig::new(), |job| {
        job.name = "hooked".to_string();
        job.input_paths.push(PathBuf::from("/data/in"));
    })
    .await
    .expect("run should succeed");
    assert_eq!(summary, JobSummary::default());
    assert_eq!(engine.runs.load(Ordering::SeqCst), 1);
}
