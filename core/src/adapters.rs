use crate::phase::PhaseKind;
use crate::registry::{ReaderFn, WriterFn};
use serde_json::Value;
use std::sync::Arc;

/// Default input adapter for a phase.
///
/// Map input arrives as raw text and stays a string value. Reduce and
/// combine input arrives as text the universal writer produced, so it is
/// parsed back as JSON, with a plain string fallback for text that never
/// went through the writer.
pub fn default_input_adapter(phase: PhaseKind) -> ReaderFn {
    match phase {
        PhaseKind::Map => Arc::new(|raw| Ok(Value::String(raw.to_string()))),
        PhaseKind::Reduce | PhaseKind::Combiner => Arc::new(|raw| Ok(parse_lenient(raw))),
    }
}

/// Default output adapter; the same universal writer for every phase.
pub fn default_output_adapter(_phase: PhaseKind) -> WriterFn {
    Arc::new(|key, value| Ok((render(key)?, render(value)?)))
}

// Strings render bare so text pipelines round-trip; everything else is
// compact JSON.
fn render(value: &Value) -> anyhow::Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Ok(serde_json::to_string(other)?),
    }
}

fn parse_lenient(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
