/// Destination for the native pairs a composed entry point emits.
///
/// Implemented by the host engine; workers only ever see it as a trait
/// object handed in per invocation.
pub trait OutputSink {
    fn collect(&mut self, key: String, value: String) -> anyhow::Result<()>;
}

/// Vec-backed sink used by tests and by the in-process host's shuffle.
#[derive(Debug, Default)]
pub struct MemorySink {
    pairs: Vec<(String, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

impl OutputSink for MemorySink {
    fn collect(&mut self, key: String, value: String) -> anyhow::Result<()> {
        self.pairs.push((key, value));
        Ok(())
    }
}
