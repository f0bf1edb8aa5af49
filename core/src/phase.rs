use crate::config::CONFIG_NS;
use std::fmt;
use std::str::FromStr;

/// Processing role a worker plays for one partition of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Map,
    Reduce,
    Combiner,
}

impl PhaseKind {
    /// Every phase kind, for registry lock-step checks.
    pub const ALL: [PhaseKind; 3] = [PhaseKind::Map, PhaseKind::Reduce, PhaseKind::Combiner];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseKind::Map => "map",
            PhaseKind::Reduce => "reduce",
            PhaseKind::Combiner => "combiner",
        }
    }

    /// Configuration key holding the user function identifier for this phase.
    pub fn function_key(&self) -> String {
        format!("{}.job.{}", CONFIG_NS, self.as_str())
    }

    /// Configuration key holding the optional input-adapter identifier.
    pub fn reader_key(&self) -> String {
        format!("{}.job.{}.reader", CONFIG_NS, self.as_str())
    }

    /// Configuration key holding the optional output-adapter identifier.
    pub fn writer_key(&self) -> String {
        format!("{}.job.{}.writer", CONFIG_NS, self.as_str())
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "map" => Ok(PhaseKind::Map),
            "reduce" => Ok(PhaseKind::Reduce),
            "combiner" => Ok(PhaseKind::Combiner),
            other => Err(format!(
                "unknown phase '{}' (expected map, reduce or combiner)",
                other
            )),
        }
    }
}
