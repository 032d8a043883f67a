use super::types::{HookAction, QueryContext, QueryHook, QueryResult};
use crate::config::truncate_for_log;
use std::time::Duration;
use tracing::Level;

/// A `tracing`-based hook that emits every descriptor before it is dispatched,
/// and the row count or error afterwards.
#[derive(Debug, Clone)]
pub struct TracingQueryHook {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long descriptors (in bytes). `None` means no truncation.
    pub max_len: Option<usize>,
}

impl Default for TracingQueryHook {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_len: Some(200),
        }
    }
}

impl TracingQueryHook {
    /// Create a new hook with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum descriptor length to display.
    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// Disable truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_len = None;
        self
    }
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl QueryHook for TracingQueryHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let descriptor = truncate_for_log(&ctx.descriptor.to_string(), self.max_len);
        let tag = ctx.tag.as_deref().unwrap_or("-");
        emit_at_level!(
            self.level,
            target: "modelq.query",
            kind = ctx.kind.as_str(),
            tag,
            descriptor = %descriptor,
            fields = ?ctx.fields,
        );
        HookAction::Continue
    }

    fn after_query(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        let tag = ctx.tag.as_deref().unwrap_or("-");
        emit_at_level!(
            self.level,
            target: "modelq.query",
            kind = ctx.kind.as_str(),
            tag,
            elapsed = ?duration,
            result = %result,
        );
    }
}
