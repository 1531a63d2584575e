use crate::log::{log_level::LogLevel, log_sink::LogSink};

/// Named sink that discards every message.
#[derive(Debug, Clone)]
pub struct NoopLogSink {
    name: String,
}

impl NoopLogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for NoopLogSink {
    fn default() -> Self {
        Self::new("noop")
    }
}

impl LogSink for NoopLogSink {
    #[inline]
    fn log(&self, _level: LogLevel, _msg: &str, _target: &'static str) {}

    fn name(&self) -> &str {
        &self.name
    }
}
