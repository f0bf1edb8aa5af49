use crate::config::JobConfig;
use crate::error::BindingError;
use crate::installer;
use crate::phase::PhaseKind;
use crate::sink::OutputSink;
use crate::wrapper::BoundEntryPoint;

/// Binding state of one worker instance.
///
/// Workers start `Uninitialized` and move to `Bound` at configure time;
/// there is no transition back for the worker's lifetime.
#[derive(Default)]
pub enum Binding {
    #[default]
    Uninitialized,
    Bound(BoundEntryPoint),
}

impl Binding {
    pub fn is_bound(&self) -> bool {
        matches!(self, Binding::Bound(_))
    }
}

/// Map-phase worker. The host instantiates it with no arguments, calls
/// `configure` once with the distributed job configuration, then invokes
/// `map` once per input record.
#[derive(Default)]
pub struct MapWorker {
    binding: Binding,
}

impl MapWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&mut self, config: &JobConfig) -> Result<(), BindingError> {
        installer::install_binding(PhaseKind::Map, config, &mut self.binding)
    }

    pub fn is_configured(&self) -> bool {
        self.binding.is_bound()
    }

    pub fn map(
        &mut self,
        sink: &mut dyn OutputSink,
        key: &str,
        value: &str,
    ) -> Result<(), BindingError> {
        match &self.binding {
            Binding::Bound(BoundEntryPoint::Map(entry)) => entry(sink, key, value),
            _ => Err(BindingError::PhaseNotConfigured(PhaseKind::Map)),
        }
    }
}

/// Reduce-phase worker; invoked once per key with a lazy, single-pass
/// sequence of that key's values.
pub struct ReduceWorker {
    phase: PhaseKind,
    binding: Binding,
}

impl Default for ReduceWorker {
    fn default() -> Self {
        Self {
            phase: PhaseKind::Reduce,
            binding: Binding::Uninitialized,
        }
    }
}

impl ReduceWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&mut self, config: &JobConfig) -> Result<(), BindingError> {
        installer::install_binding(self.phase, config, &mut self.binding)
    }

    pub fn is_configured(&self) -> bool {
        self.binding.is_bound()
    }

    pub fn reduce(
        &mut self,
        sink: &mut dyn OutputSink,
        key: &str,
        values: &mut dyn Iterator<Item = String>,
    ) -> Result<(), BindingError> {
        match &self.binding {
            Binding::Bound(BoundEntryPoint::Reduce(entry)) => entry(sink, key, values),
            _ => Err(BindingError::PhaseNotConfigured(self.phase)),
        }
    }
}

/// Combine-phase worker: the reduce contract bound through the combiner
/// configuration keys.
pub struct CombineWorker {
    inner: ReduceWorker,
}

impl Default for CombineWorker {
    fn default() -> Self {
        Self {
            inner: ReduceWorker {
                phase: PhaseKind::Combiner,
                binding: Binding::Uninitialized,
            },
        }
    }
}

impl CombineWorker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&mut self, config: &JobConfig) -> Result<(), BindingError> {
        self.inner.configure(config)
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    pub fn combine(
        &mut self,
        sink: &mut dyn OutputSink,
        key: &str,
        values: &mut dyn Iterator<Item = String>,
    ) -> Result<(), BindingError> {
        self.inner.reduce(sink, key, values)
    }
}
