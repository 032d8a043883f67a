use super::config::MonitorConfig;
use super::monitors::{CompositeHook, NoopMonitor};
use super::types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryResult};
use crate::descriptor::QueryDescriptor;
use crate::error::{OrmError, OrmResult};
use crate::registry::Backend;
use crate::row::Row;
use async_trait::async_trait;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

/// A backend wrapper that runs hooks and reports to a monitor around every
/// dispatch.
///
/// Hooks always run. Monitors only receive events once monitoring is enabled
/// via [`MonitorConfig::enable_monitoring`].
///
/// # Example
/// ```ignore
/// let stats = Arc::new(StatsMonitor::new());
/// let backend = InstrumentedBackend::new(widget_backend)
///     .with_tag("widget")
///     .with_config(MonitorConfig::new().enable_monitoring())
///     .with_monitor_arc(stats.clone())
///     .with_hook(TracingQueryHook::new());
/// registry.register("widget", backend);
/// ```
pub struct InstrumentedBackend<B> {
    inner: B,
    tag: Option<String>,
    monitor: Arc<dyn QueryMonitor>,
    hook: Option<Arc<dyn QueryHook>>,
    config: MonitorConfig,
}

impl<B: Backend> InstrumentedBackend<B> {
    /// Wrap a backend with no monitoring.
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            tag: None,
            monitor: Arc::new(NoopMonitor),
            hook: None,
            config: MonitorConfig::default(),
        }
    }

    /// Tag every query context (usually with the entity name).
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the monitor configuration.
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the query monitor.
    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    /// Set the query monitor from an Arc.
    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Set a query hook, replacing any existing one.
    pub fn with_hook<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Add a query hook.
    ///
    /// If a hook is already set, this composes it with the new hook (existing first).
    pub fn add_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.add_hook_arc(Arc::new(hook))
    }

    /// Add a query hook from an `Arc`.
    pub fn add_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = Some(match self.hook.take() {
            None => hook,
            Some(existing) => Arc::new(CompositeHook::new().add_arc(existing).add_arc(hook)),
        });
        self
    }

    /// Check if monitoring is enabled.
    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.monitoring_enabled
    }

    /// The wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn context(&self, descriptor: &QueryDescriptor) -> QueryContext {
        let ctx = QueryContext::new(descriptor.clone());
        match &self.tag {
            Some(tag) => ctx.with_tag(tag.clone()),
            None => ctx,
        }
    }
}

#[async_trait]
impl<B: Backend> Backend for InstrumentedBackend<B> {
    async fn execute_query(&self, descriptor: &QueryDescriptor) -> OrmResult<Vec<Row>> {
        let mut ctx = self.context(descriptor);
        let monitoring = self.config.monitoring_enabled;

        let mut descriptor = Cow::Borrowed(descriptor);
        if let Some(hook) = &self.hook {
            match hook.before_query(&ctx) {
                HookAction::Continue => {}
                HookAction::Replace(replacement) => {
                    ctx.descriptor = replacement.clone();
                    descriptor = Cow::Owned(replacement);
                }
                HookAction::Abort(reason) => {
                    if monitoring {
                        let result = QueryResult::error(format!("aborted: {reason}"));
                        self.monitor
                            .on_query_complete(&ctx, std::time::Duration::ZERO, &result);
                    }
                    return Err(OrmError::Aborted(reason));
                }
            }
        }

        if monitoring {
            self.monitor.on_query_start(&ctx);
        }

        let start = Instant::now();
        let outcome = self.inner.execute_query(&descriptor).await;
        let duration = start.elapsed();

        let result = match &outcome {
            Ok(rows) => QueryResult::Rows(rows.len()),
            Err(e) => QueryResult::error(e.to_string()),
        };

        if let Some(hook) = &self.hook {
            if outcome.is_ok() {
                hook.after_query(&ctx, duration, &result);
            }
        }

        if monitoring {
            self.monitor.on_query_complete(&ctx, duration, &result);
            if let Some(threshold) = self.config.slow_query_threshold {
                if duration > threshold {
                    self.monitor.on_slow_query(&ctx, duration);
                }
            }
        }

        outcome
    }
}
