//! Ambient handle to the job currently being configured.
//!
//! Job context is threaded explicitly through every operation in this
//! crate; this slot exists only for host callbacks that cannot receive
//! context. It is overwritten on every configure event and is meaningful
//! only until the next one.

use crate::config::JobConfig;
use once_cell::sync::Lazy;
use std::sync::Mutex;

static ACTIVE: Lazy<Mutex<Option<JobConfig>>> = Lazy::new(|| Mutex::new(None));

/// Records `config` as the job currently being configured.
pub fn set(config: JobConfig) {
    *ACTIVE.lock().unwrap() = Some(config);
}

/// Configuration recorded by the most recent configure event, if any.
pub fn current() -> Option<JobConfig> {
    ACTIVE.lock().unwrap().clone()
}
