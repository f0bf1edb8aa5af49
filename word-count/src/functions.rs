use mapbind_core::registry;
use serde_json::{json, Value};

/// Registered identifier of the tokenizing map function.
pub const MAP_FN: &str = "word-count/map";
/// Registered identifier of the summing reduce function; doubles as the
/// combiner since summing is associative.
pub const REDUCE_FN: &str = "word-count/reduce";

/// Registers the word-count functions. Call once at process start, before
/// any worker is configured.
pub fn register() {
    registry::register_map(MAP_FN, |_key, value| {
        let text = match &value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Ok(text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(|word| (Value::String(word.to_lowercase()), json!(1)))
            .collect())
    });

    registry::register_reduce(REDUCE_FN, |key, values: &mut dyn Iterator<Item = Value>| {
        let mut total: i64 = 0;
        for value in values {
            total += value.as_i64().unwrap_or(0);
        }
        Ok(vec![(key, json!(total))])
    });
}
