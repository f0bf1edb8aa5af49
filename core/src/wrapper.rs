use crate::error::BindingError;
use crate::phase::PhaseKind;
use crate::registry::{MapFn, ReaderFn, ReduceFn, WriterFn};
use crate::sink::OutputSink;
use serde_json::Value;
use std::cell::Cell;

/// Entry point invoked by the host once per input record.
pub type MapEntryPoint =
    Box<dyn Fn(&mut dyn OutputSink, &str, &str) -> Result<(), BindingError> + Send>;

/// Entry point invoked by the host once per key with all its values.
pub type ReduceEntryPoint = Box<
    dyn Fn(&mut dyn OutputSink, &str, &mut dyn Iterator<Item = String>) -> Result<(), BindingError>
        + Send,
>;

/// The single callable produced by composing a user function with its
/// input and output adapters. Owned by exactly one worker instance and
/// replaced wholesale on each configuration event.
pub enum BoundEntryPoint {
    Map(MapEntryPoint),
    Reduce(ReduceEntryPoint),
}

/// Composition strategy for a phase. The variant tells the installer which
/// user-function shape the phase demands.
pub enum WrapperFactory {
    /// Per-record strategy, used by the map phase.
    PerRecord(fn(PhaseKind, MapFn, ReaderFn, WriterFn) -> BoundEntryPoint),
    /// Per-key strategy, shared by the reduce and combine phases.
    PerKey(fn(PhaseKind, ReduceFn, ReaderFn, WriterFn) -> BoundEntryPoint),
}

pub fn factory_for(phase: PhaseKind) -> WrapperFactory {
    match phase {
        PhaseKind::Map => WrapperFactory::PerRecord(compose_map),
        PhaseKind::Reduce | PhaseKind::Combiner => WrapperFactory::PerKey(compose_reduce),
    }
}

fn record_failure(phase: PhaseKind, key: &str, source: anyhow::Error) -> BindingError {
    BindingError::PhaseExecution {
        phase,
        key: key.to_string(),
        source,
    }
}

/// Map strategy: adapt key and value, invoke the user function, write each
/// emitted pair through the output adapter. Zero emissions is a valid
/// filtering outcome.
fn compose_map(
    phase: PhaseKind,
    function: MapFn,
    reader: ReaderFn,
    writer: WriterFn,
) -> BoundEntryPoint {
    BoundEntryPoint::Map(Box::new(move |sink, raw_key, raw_value| {
        let key = reader(raw_key).map_err(|e| record_failure(phase, raw_key, e))?;
        let value = reader(raw_value).map_err(|e| record_failure(phase, raw_key, e))?;
        let emitted = function(key, value).map_err(|e| record_failure(phase, raw_key, e))?;
        for (out_key, out_value) in emitted {
            let (native_key, native_value) =
                writer(&out_key, &out_value).map_err(|e| record_failure(phase, raw_key, e))?;
            sink.collect(native_key, native_value)
                .map_err(|e| record_failure(phase, raw_key, e))?;
        }
        Ok(())
    }))
}

/// Reduce/combine strategy: adapt the key, hand the user function a lazy
/// view over the value sequence, write each emitted pair. The sequence is
/// single-pass and may be too large to materialize; adaptation happens one
/// element at a time as the user function pulls.
fn compose_reduce(
    phase: PhaseKind,
    function: ReduceFn,
    reader: ReaderFn,
    writer: WriterFn,
) -> BoundEntryPoint {
    BoundEntryPoint::Reduce(Box::new(move |sink, raw_key, raw_values| {
        let key = reader(raw_key).map_err(|e| record_failure(phase, raw_key, e))?;

        let failure = Cell::new(None);
        let mut adapted = AdaptedValues {
            raw: raw_values,
            reader: &reader,
            failure: &failure,
            failed: false,
        };
        let result = function(key, &mut adapted);

        // A reader failure truncates the sequence; report it as the root
        // cause even if the user function also failed on the partial data.
        if let Some(source) = failure.take() {
            return Err(record_failure(phase, raw_key, source));
        }
        let emitted = result.map_err(|e| record_failure(phase, raw_key, e))?;

        for (out_key, out_value) in emitted {
            let (native_key, native_value) =
                writer(&out_key, &out_value).map_err(|e| record_failure(phase, raw_key, e))?;
            sink.collect(native_key, native_value)
                .map_err(|e| record_failure(phase, raw_key, e))?;
        }
        Ok(())
    }))
}

/// Lazily adapts native values as the user function pulls them. The first
/// reader failure ends the sequence and is stashed for the caller.
struct AdaptedValues<'a> {
    raw: &'a mut dyn Iterator<Item = String>,
    reader: &'a ReaderFn,
    failure: &'a Cell<Option<anyhow::Error>>,
    failed: bool,
}

impl Iterator for AdaptedValues<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.failed {
            return None;
        }
        let raw = self.raw.next()?;
        match (self.reader)(&raw) {
            Ok(value) => Some(value),
            Err(source) => {
                self.failed = true;
                self.failure.set(Some(source));
                None
            }
        }
    }
}
