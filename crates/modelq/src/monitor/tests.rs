use super::*;
use crate::descriptor::{QueryDescriptor, QueryKind};
use crate::error::{OrmError, OrmResult};
use crate::registry::Backend;
use crate::row::Row;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Shared test backends ──

/// Returns one empty row per call and remembers the last descriptor.
#[derive(Default)]
struct EchoBackend {
    last: Mutex<Option<QueryDescriptor>>,
}

#[async_trait]
impl Backend for EchoBackend {
    async fn execute_query(&self, descriptor: &QueryDescriptor) -> OrmResult<Vec<Row>> {
        *self.last.lock().unwrap() = Some(descriptor.clone());
        Ok(vec![Row::new()])
    }
}

struct FailingBackend;

#[async_trait]
impl Backend for FailingBackend {
    async fn execute_query(&self, _: &QueryDescriptor) -> OrmResult<Vec<Row>> {
        Err(OrmError::backend(std::io::Error::other("connection refused")))
    }
}

struct SleepyBackend(Duration);

#[async_trait]
impl Backend for SleepyBackend {
    async fn execute_query(&self, _: &QueryDescriptor) -> OrmResult<Vec<Row>> {
        tokio::time::sleep(self.0).await;
        Ok(vec![])
    }
}

struct AbortHook;

impl QueryHook for AbortHook {
    fn before_query(&self, _: &QueryContext) -> HookAction {
        HookAction::Abort("read-only window".to_string())
    }
}

/// Caps every query at `limit`.
struct LimitHook(u64);

impl QueryHook for LimitHook {
    fn before_query(&self, ctx: &QueryContext) -> HookAction {
        let mut descriptor = ctx.descriptor.clone();
        descriptor.limit = Some(descriptor.limit.map_or(self.0, |l| l.min(self.0)));
        HookAction::Replace(descriptor)
    }
}

#[derive(Default)]
struct CountingHook {
    before: AtomicUsize,
    after: AtomicUsize,
}

impl QueryHook for CountingHook {
    fn before_query(&self, _: &QueryContext) -> HookAction {
        self.before.fetch_add(1, Ordering::SeqCst);
        HookAction::Continue
    }

    fn after_query(&self, _: &QueryContext, _: Duration, _: &QueryResult) {
        self.after.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct SlowRecorder {
    slow: AtomicUsize,
}

impl QueryMonitor for SlowRecorder {
    fn on_query_complete(&self, _: &QueryContext, _: Duration, _: &QueryResult) {}

    fn on_slow_query(&self, _: &QueryContext, _: Duration) {
        self.slow.fetch_add(1, Ordering::SeqCst);
    }
}

fn find_all_descriptor() -> QueryDescriptor {
    QueryDescriptor::new(QueryKind::FindAll)
}

#[test]
fn test_query_result_error_truncation() {
    let long = "x".repeat(600);
    match QueryResult::error(long) {
        QueryResult::Error(msg) => {
            assert_eq!(msg.len(), 515);
            assert!(msg.ends_with("..."));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(QueryResult::Rows(3).to_string(), "3 rows");
}

#[test]
fn test_context_carries_kind() {
    let ctx = QueryContext::new(QueryDescriptor::new(QueryKind::Count))
        .with_tag("widget")
        .with_field("tenant", "acme");
    assert_eq!(ctx.kind, QueryKind::Count);
    assert_eq!(ctx.tag.as_deref(), Some("widget"));
    assert_eq!(ctx.fields.get("tenant").map(String::as_str), Some("acme"));
}

#[test]
fn test_composite_hook_chains_replacements() {
    let hook = CompositeHook::new().add(LimitHook(50)).add(LimitHook(10));
    let ctx = QueryContext::new(find_all_descriptor());
    match hook.before_query(&ctx) {
        HookAction::Replace(d) => assert_eq!(d.limit, Some(10)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_composite_hook_abort_short_circuits() {
    let counting = Arc::new(CountingHook::default());
    let hook = CompositeHook::new()
        .add(AbortHook)
        .add_arc(counting.clone());
    let ctx = QueryContext::new(find_all_descriptor());
    assert!(matches!(hook.before_query(&ctx), HookAction::Abort(_)));
    assert_eq!(counting.before.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_instrumented_counts_by_kind() {
    let stats = Arc::new(StatsMonitor::new());
    let backend = InstrumentedBackend::new(EchoBackend::default())
        .with_config(MonitorConfig::new().enable_monitoring())
        .with_monitor_arc(stats.clone());

    backend.execute_query(&find_all_descriptor()).await.unwrap();
    backend
        .execute_query(&QueryDescriptor::new(QueryKind::Count))
        .await
        .unwrap();

    let s = stats.stats();
    assert_eq!(s.total_queries, 2);
    assert_eq!(s.find_all_count, 1);
    assert_eq!(s.count_count, 1);
    assert_eq!(s.failed_queries, 0);

    stats.reset();
    assert_eq!(stats.stats(), QueryStats::default());
}

#[tokio::test]
async fn test_instrumented_monitoring_disabled_by_default() {
    let stats = Arc::new(StatsMonitor::new());
    let backend =
        InstrumentedBackend::new(EchoBackend::default()).with_monitor_arc(stats.clone());
    assert!(!backend.is_monitoring_enabled());

    backend.execute_query(&find_all_descriptor()).await.unwrap();
    assert_eq!(stats.stats().total_queries, 0);
}

#[tokio::test]
async fn test_instrumented_passes_backend_errors_through() {
    let stats = Arc::new(StatsMonitor::new());
    let backend = InstrumentedBackend::new(FailingBackend)
        .with_config(MonitorConfig::new().enable_monitoring())
        .with_monitor_arc(stats.clone());

    let err = backend.execute_query(&find_all_descriptor()).await.unwrap_err();
    assert!(matches!(err, OrmError::Backend(_)));
    assert_eq!(stats.stats().failed_queries, 1);
}

#[tokio::test]
async fn test_instrumented_abort() {
    let backend = InstrumentedBackend::new(EchoBackend::default()).with_hook(AbortHook);
    let err = backend.execute_query(&find_all_descriptor()).await.unwrap_err();
    assert!(matches!(err, OrmError::Aborted(ref r) if r == "read-only window"));
    assert!(backend.inner().last.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_instrumented_replacement_reaches_backend() {
    let backend = InstrumentedBackend::new(EchoBackend::default())
        .with_hook(LimitHook(5))
        .add_hook(TracingQueryHook::new());
    backend.execute_query(&find_all_descriptor()).await.unwrap();
    let seen = backend.inner().last.lock().unwrap().clone().unwrap();
    assert_eq!(seen.to_json(), json!({"limit": 5}));
}

#[tokio::test]
async fn test_instrumented_hooks_run_without_monitoring() {
    let counting = Arc::new(CountingHook::default());
    let backend =
        InstrumentedBackend::new(EchoBackend::default()).add_hook_arc(counting.clone());
    backend.execute_query(&find_all_descriptor()).await.unwrap();
    assert_eq!(counting.before.load(Ordering::SeqCst), 1);
    assert_eq!(counting.after.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_slow_query_threshold() {
    let recorder = Arc::new(SlowRecorder::default());
    let stats = Arc::new(StatsMonitor::new());
    let backend = InstrumentedBackend::new(SleepyBackend(Duration::from_millis(20)))
        .with_config(
            MonitorConfig::new()
                .with_slow_query_threshold(Duration::from_millis(5))
                .enable_monitoring(),
        )
        .with_monitor_arc(Arc::new(
            CompositeMonitor::new()
                .add_arc(recorder.clone())
                .add_arc(stats.clone()),
        ));

    backend.execute_query(&find_all_descriptor()).await.unwrap();
    assert_eq!(recorder.slow.load(Ordering::SeqCst), 1);
    let s = stats.stats();
    assert!(s.max_duration >= Duration::from_millis(20));
    assert_eq!(s.slowest_query.as_deref(), Some("{}"));
}
