use crate::log::log_level::LogLevel;

/// A named logging destination.
///
/// Sinks are owned by the caller; anything that keeps one around holds an
/// `Arc<dyn LogSink>` and never reconfigures it.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);

    /// Stable name identifying this sink.
    fn name(&self) -> &str;
}
