use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Namespace prefix for every configuration key this layer owns.
pub const CONFIG_NS: &str = "mapbind";

/// Key holding the job display name.
pub fn name_key() -> String {
    format!("{}.job.name", CONFIG_NS)
}

/// Key enabling the destructive replace-output policy (value `"true"`).
pub fn replace_key() -> String {
    format!("{}.job.replace", CONFIG_NS)
}

/// String-keyed, string-valued job configuration.
///
/// Built once by the job builder, serialized by the host engine to every
/// worker process, and handed read-only to each worker's configure step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    entries: HashMap<String, String>,
}

impl JobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Like `get`, but an empty value counts as absent.
    pub fn get_nonempty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// True iff the key holds exactly the string `"true"`.
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }
}
