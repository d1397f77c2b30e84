//! Overridable log sink for engine diagnostics.
//!
//! Every user-facing message the engine emits goes through a [`LogSink`] so a
//! host application can redirect diagnostics into its own logging or UI layer.
//! Supplying a sink replaces the default tracing-backed one entirely.

use std::sync::Arc;

use tracing::{error, info, warn};

/// Severity of an engine diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Destination for engine diagnostics.
///
/// Implementations must be safe for concurrent use: file tasks log from the
/// worker pool, and each `log` call carries one complete line.
pub trait LogSink: Send + Sync {
    /// Emit one diagnostic line.
    fn log(&self, level: LogLevel, message: &str);
}

/// Default sink that forwards to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => info!("{message}"),
            LogLevel::Warn => warn!("{message}"),
            LogLevel::Error => error!("{message}"),
        }
    }
}

/// Adapter that turns a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> LogSink for FnSink<F>
where
    F: Fn(LogLevel, &str) + Send + Sync,
{
    fn log(&self, level: LogLevel, message: &str) {
        (self.0)(level, message);
    }
}

/// Shared handle to the default sink.
pub fn default_sink() -> Arc<dyn LogSink> {
    Arc::new(TracingSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn closures_adapt_into_sinks() {
        let lines: Arc<Mutex<Vec<(LogLevel, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&lines);
        let sink = FnSink(move |level: LogLevel, message: &str| {
            captured.lock().unwrap().push((level, message.to_string()));
        });

        sink.log(LogLevel::Warn, "skipping entry");
        sink.log(LogLevel::Info, "done");

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], (LogLevel::Warn, "skipping entry".to_string()));
    }
}
