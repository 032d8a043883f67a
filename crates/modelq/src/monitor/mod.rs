//! Query monitoring and hooks around backend dispatch.
//!
//! This module provides traits and utilities for:
//! - Timing every dispatched descriptor
//! - Hooking into the dispatch lifecycle (inspect, replace or abort)
//! - Logging via `tracing` and collecting statistics
//!
//! # Example
//!
//! ```rust,ignore
//! use modelq::monitor::{InstrumentedBackend, MonitorConfig, StatsMonitor, TracingQueryHook};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let stats = Arc::new(StatsMonitor::new());
//! let config = MonitorConfig::new()
//!     .with_slow_query_threshold(Duration::from_millis(250))
//!     .enable_monitoring();
//!
//! let backend = InstrumentedBackend::new(widget_backend)
//!     .with_tag("widget")
//!     .with_config(config)
//!     .with_monitor_arc(stats.clone())
//!     .with_hook(TracingQueryHook::new());
//! ```

mod config;
mod instrumented;
mod monitors;
mod tracing_hook;
mod types;

#[cfg(test)]
mod tests;

pub use config::MonitorConfig;
pub use instrumented::InstrumentedBackend;
pub use monitors::{CompositeHook, CompositeMonitor, NoopMonitor, QueryStats, StatsMonitor};
pub use tracing_hook::TracingQueryHook;
pub use types::{HookAction, QueryContext, QueryHook, QueryMonitor, QueryResult};
