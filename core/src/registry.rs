use crate::error::BindingError;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// A key/value pair in the host-language value domain.
pub type Pair = (Value, Value);

/// User map function: one adapted key and value in, zero or more pairs out.
pub type MapFn = Arc<dyn Fn(Value, Value) -> anyhow::Result<Vec<Pair>> + Send + Sync>;

/// User reduce/combine function: one adapted key and a lazy, single-pass
/// sequence of adapted values in, zero or more pairs out.
pub type ReduceFn =
    Arc<dyn Fn(Value, &mut dyn Iterator<Item = Value>) -> anyhow::Result<Vec<Pair>> + Send + Sync>;

/// Input adapter: one native text record into a value. Pure and stateless.
pub type ReaderFn = Arc<dyn Fn(&str) -> anyhow::Result<Value> + Send + Sync>;

/// Output adapter: one emitted value pair back into native text.
pub type WriterFn = Arc<dyn Fn(&Value, &Value) -> anyhow::Result<(String, String)> + Send + Sync>;

/// A callable value reachable by identifier.
#[derive(Clone)]
pub enum Callable {
    Map(MapFn),
    Reduce(ReduceFn),
    Reader(ReaderFn),
    Writer(WriterFn),
}

impl Callable {
    pub fn kind(&self) -> &'static str {
        match self {
            Callable::Map(_) => "map",
            Callable::Reduce(_) => "reduce",
            Callable::Reader(_) => "reader",
            Callable::Writer(_) => "writer",
        }
    }
}

// Identifiers are resolved out of configuration distributed with a job, so
// the mapping is process-global: user code registers at process start,
// worker configuration looks up by key. Registration replaces any earlier
// entry under the same identifier.
static REGISTRY: Lazy<RwLock<HashMap<String, Callable>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register(identifier: impl Into<String>, callable: Callable) {
    REGISTRY.write().unwrap().insert(identifier.into(), callable);
}

pub fn register_map<F>(identifier: impl Into<String>, function: F)
where
    F: Fn(Value, Value) -> anyhow::Result<Vec<Pair>> + Send + Sync + 'static,
{
    register(identifier, Callable::Map(Arc::new(function)));
}

pub fn register_reduce<F>(identifier: impl Into<String>, function: F)
where
    F: Fn(Value, &mut dyn Iterator<Item = Value>) -> anyhow::Result<Vec<Pair>>
        + Send
        + Sync
        + 'static,
{
    register(identifier, Callable::Reduce(Arc::new(function)));
}

pub fn register_reader<F>(identifier: impl Into<String>, adapter: F)
where
    F: Fn(&str) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    register(identifier, Callable::Reader(Arc::new(adapter)));
}

pub fn register_writer<F>(identifier: impl Into<String>, adapter: F)
where
    F: Fn(&Value, &Value) -> anyhow::Result<(String, String)> + Send + Sync + 'static,
{
    register(identifier, Callable::Writer(Arc::new(adapter)));
}

/// Looks up `identifier` in the registry.
///
/// Loading happens at registration time, so resolution is a cheap handle
/// clone and is safe from any number of concurrent configuration events.
pub fn resolve(identifier: &str) -> Result<Callable, BindingError> {
    REGISTRY
        .read()
        .unwrap()
        .get(identifier)
        .cloned()
        .ok_or_else(|| BindingError::UnresolvedReference(identifier.to_string()))
}
