use crate::phase::PhaseKind;

/// Errors raised while binding user functions into a worker, or while the
/// composed entry point is driving records.
///
/// Every variant is fatal at this layer; retry policy belongs to the host
/// engine at task granularity.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The identifier is not present in the function registry.
    #[error("identifier '{0}' does not resolve to any registered callable")]
    UnresolvedReference(String),

    /// An adapter slot was bound to a callable of the wrong kind.
    #[error("identifier '{identifier}' resolves to a {found} callable, not a {expected}")]
    NotCallable {
        identifier: String,
        expected: &'static str,
        found: &'static str,
    },

    /// No function identifier was configured for the phase.
    #[error("no function configured for the {} phase ('{}' is absent or empty)", .0, .0.function_key())]
    MissingFunctionBinding(PhaseKind),

    /// The phase-function slot was bound to a callable of the wrong kind.
    #[error("identifier '{identifier}' cannot serve as a {phase} function (it is a {found} callable)")]
    InvalidBinding {
        phase: PhaseKind,
        identifier: String,
        found: &'static str,
    },

    /// A record reached a worker whose binding was never installed.
    #[error("{0} worker invoked before any function binding was installed")]
    PhaseNotConfigured(PhaseKind),

    /// The user function, an adapter, or the sink failed on one record.
    #[error("{phase} phase failed on record key '{key}': {source}")]
    PhaseExecution {
        phase: PhaseKind,
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Errors surfaced by the job lifecycle and the host engine boundary.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Malformed command-line overrides; reported before any work starts.
    #[error("{0}")]
    Usage(String),

    /// An input path could not be read.
    #[error("input '{path}': {source}")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The output location could not be prepared or written.
    #[error("output '{path}': {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A worker task failed; carries the underlying binding failure.
    #[error("worker task failed: {0}")]
    Task(#[from] BindingError),

    /// Failure inside the host engine machinery itself.
    #[error("host engine failure: {0}")]
    Engine(String),

    /// The run was cancelled before completion.
    #[error("job cancelled before completion")]
    Cancelled,
}
