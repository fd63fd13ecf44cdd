//! Logger port used by the format adapters
//!
//! The default logger forwards to `tracing`. [`StrictLogger`] turns warnings
//! and errors into [`Error::Logged`] so tests and strict callers fail fast on
//! anything an adapter had to skip.

use crate::error::{Error, Result};
use std::fmt::Write;
use std::sync::Arc;
pub use tracing::Level;

/// Structured log sink
pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str, context: &[(&str, &str)]) -> Result<()>;

    fn debug(&self, message: &str, context: &[(&str, &str)]) -> Result<()> {
        self.log(Level::DEBUG, message, context)
    }

    fn warn(&self, message: &str, context: &[(&str, &str)]) -> Result<()> {
        self.log(Level::WARN, message, context)
    }
}

/// Shared logger handle
pub type SharedLogger = Arc<dyn Logger>;

/// Forwards every record to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, context: &[(&str, &str)]) -> Result<()> {
        let context = render_context(context);
        match level {
            Level::ERROR => tracing::error!(context = %context, "{}", message),
            Level::WARN => tracing::warn!(context = %context, "{}", message),
            Level::INFO => tracing::info!(context = %context, "{}", message),
            Level::DEBUG => tracing::debug!(context = %context, "{}", message),
            _ => tracing::trace!(context = %context, "{}", message),
        }
        Ok(())
    }
}

/// Raises warnings and errors instead of only logging them
#[derive(Debug, Clone, Default)]
pub struct StrictLogger<L = TracingLogger> {
    inner: L,
}

impl<L: Logger> StrictLogger<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

impl<L: Logger> Logger for StrictLogger<L> {
    fn log(&self, level: Level, message: &str, context: &[(&str, &str)]) -> Result<()> {
        self.inner.log(level, message, context)?;
        // tracing orders levels by verbosity, so WARN and ERROR are the smallest
        if level <= Level::WARN {
            let mut message = message.to_string();
            if !context.is_empty() {
                let _ = write!(message, " ({})", render_context(context));
            }
            return Err(Error::Logged {
                level: level.to_string(),
                message,
            });
        }
        Ok(())
    }
}

fn render_context(context: &[(&str, &str)]) -> String {
    context
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_logger_never_fails() {
        let logger = TracingLogger;
        assert!(logger.warn("skipped", &[("script", "0")]).is_ok());
        assert!(logger.log(Level::ERROR, "broken", &[]).is_ok());
    }

    #[test]
    fn test_strict_logger_raises_warnings() {
        let logger = StrictLogger::<TracingLogger>::default();
        assert!(logger.debug("fine", &[]).is_ok());
        assert!(logger.log(Level::INFO, "fine", &[]).is_ok());
        assert_eq!(
            logger.warn("skipped", &[("script", "0")]),
            Err(Error::Logged {
                level: "WARN".to_string(),
                message: "skipped (script=0)".to_string()
            })
        );
        assert!(logger.log(Level::ERROR, "broken", &[]).is_err());
    }
}
