use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, trace, warn, Level};

use crate::config::LoggingConfig;

/// Destination for gateway diagnostics. Implementations cannot fail.
pub trait GatewayLog: Send + Sync {
    fn log(&self, level: Level, message: &str, context: &Value);
}

/// Routes gateway diagnostics into `tracing`, tagged with a channel name.
#[derive(Debug, Clone)]
pub struct TracingLog {
    channel: String,
}

impl TracingLog {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

}

impl GatewayLog for TracingLog {
    fn log(&self, level: Level, message: &str, context: &Value) {
        let channel = self.channel.as_str();
        match level {
            Level::ERROR => error!(channel, context = %context, "{message}"),
            Level::WARN => warn!(channel, context = %context, "{message}"),
            Level::INFO => info!(channel, context = %context, "{message}"),
            Level::DEBUG => debug!(channel, context = %context, "{message}"),
            _ => trace!(channel, context = %context, "{message}"),
        }
    }
}

/// Applies the enabled flag and minimum level before handing events to a sink.
#[derive(Clone)]
pub struct GatedLog {
    sink: Arc<dyn GatewayLog>,
    enabled: bool,
    min_level: Level,
}

impl GatedLog {
    pub fn new(sink: Arc<dyn GatewayLog>, config: &LoggingConfig) -> Self {
        Self {
            sink,
            enabled: config.enabled,
            min_level: config.level,
        }
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(Arc::new(TracingLog::new(config.channel.clone())), config)
    }

    pub fn disabled() -> Self {
        Self {
            sink: Arc::new(TracingLog::new("disabled")),
            enabled: false,
            min_level: Level::ERROR,
        }
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        // tracing orders levels by verbosity: TRACE > DEBUG > ... > ERROR.
        self.enabled && level <= self.min_level
    }

    pub fn error(&self, message: &str, context: Value) {
        self.emit(Level::ERROR, message, context);
    }

    pub fn warn(&self, message: &str, context: Value) {
        self.emit(Level::WARN, message, context);
    }

    pub fn info(&self, message: &str, context: Value) {
        self.emit(Level::INFO, message, context);
    }

    fn emit(&self, level: Level, message: &str, context: Value) {
        if !self.is_enabled(level) {
            return;
        }
        let sink = &self.sink;
        if catch_unwind(AssertUnwindSafe(|| sink.log(level, message, &context))).is_err() {
            warn!(event = message, "gateway log sink panicked; event dropped");
        }
    }
}

impl std::fmt::Debug for GatedLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatedLog")
            .field("enabled", &self.enabled)
            .field("min_level", &self.min_level)
            .finish()
    }
}
