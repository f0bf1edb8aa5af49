use crate::active_job;
use crate::adapters;
use crate::config::JobConfig;
use crate::error::BindingError;
use crate::phase::PhaseKind;
use crate::registry::{self, Callable, ReaderFn, WriterFn};
use crate::worker::Binding;
use crate::wrapper::{self, WrapperFactory};
use tracing::debug;

/// Resolves the configured function and adapters for `phase` out of a
/// job's configuration and installs the composed entry point into
/// `binding`.
///
/// The binding is only written in the final step, so any failure along the
/// way leaves the worker exactly as it was (normally `Uninitialized`).
/// Calling this twice with the same configuration re-resolves everything
/// and replaces the entry point wholesale; safe but wasteful.
pub fn install_binding(
    phase: PhaseKind,
    config: &JobConfig,
    binding: &mut Binding,
) -> Result<(), BindingError> {
    active_job::set(config.clone());

    let identifier = config
        .get_nonempty(&phase.function_key())
        .ok_or(BindingError::MissingFunctionBinding(phase))?
        .to_string();
    let function = registry::resolve(&identifier)?;

    let reader = resolve_reader(phase, config)?;
    let writer = resolve_writer(phase, config)?;

    let entry = match wrapper::factory_for(phase) {
        WrapperFactory::PerRecord(compose) => match function {
            Callable::Map(f) => compose(phase, f, reader, writer),
            other => {
                return Err(BindingError::InvalidBinding {
                    phase,
                    identifier,
                    found: other.kind(),
                })
            }
        },
        WrapperFactory::PerKey(compose) => match function {
            Callable::Reduce(f) => compose(phase, f, reader, writer),
            other => {
                return Err(BindingError::InvalidBinding {
                    phase,
                    identifier,
                    found: other.kind(),
                })
            }
        },
    };

    debug!(phase = %phase, function = %identifier, "installed phase binding");
    *binding = Binding::Bound(entry);
    Ok(())
}

fn resolve_reader(phase: PhaseKind, config: &JobConfig) -> Result<ReaderFn, BindingError> {
    match config.get_nonempty(&phase.reader_key()) {
        Some(identifier) => match registry::resolve(identifier)? {
            Callable::Reader(reader) => Ok(reader),
            other => Err(BindingError::NotCallable {
                identifier: identifier.to_string(),
                expected: "reader",
                found: other.kind(),
            }),
        },
        None => Ok(adapters::default_input_adapter(phase)),
    }
}

fn resolve_writer(phase: PhaseKind, config: &JobConfig) -> Result<WriterFn, BindingError> {
    match config.get_nonempty(&phase.writer_key()) {
        Some(identifier) => match registry::resolve(identifier)? {
            Callable::Writer(writer) => Ok(writer),
            other => Err(BindingError::NotCallable {
                identifier: identifier.to_string(),
                expected: "writer",
                found: other.kind(),
            }),
        },
        None => Ok(adapters::default_output_adapter(phase)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::active_job;

    #[test]
    fn configure_records_the_active_job_handle() {
        registry::register_map("installer/active-job-map", |key, value| {
            Ok(vec![(key, value)])
        });

        let mut config = JobConfig::new();
        config.set(PhaseKind::Map.function_key(), "installer/active-job-map");

        let mut binding = Binding::Uninitialized;
        install_binding(PhaseKind::Map, &config, &mut binding)
            .expect("install should succeed");

        assert_eq!(
            active_job::current().as_ref(),
            Some(&config),
            "install must record the job as the active job handle"
        );
        assert!(binding.is_bound());
    }
}
