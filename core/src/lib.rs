pub mod active_job;
pub mod adapters;
pub mod config;
pub mod driver;
pub mod error;
pub mod installer;
pub mod job;
pub mod phase;
pub mod registry;
pub mod sink;
pub mod worker;
pub mod wrapper;

pub use config::JobConfig;
pub use driver::{HostEngine, JobSummary};
pub use error::{BindingError, JobError};
pub use job::JobDescriptor;
pub use phase::PhaseKind;
pub use sink::{MemorySink, OutputSink};
pub use worker::{CombineWorker, MapWorker, ReduceWorker};
