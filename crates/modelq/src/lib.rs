//! # modelq
//!
//! A fluent model query layer that compiles builder calls into backend-neutral
//! query descriptors.
//!
//! ## Features
//!
//! - **Fluent builder**: chain projection, filter and pagination calls on a [`ModelQuery`]
//! - **Neutral descriptors**: every query compiles to a plain [`QueryDescriptor`], no SQL
//! - **Pluggable backends**: implement [`Backend`] and register it in a [`ModelRegistry`]
//! - **Typed rows**: decode rows into any `serde::Deserialize` type via [`FromRow`]
//! - **Query monitoring**: timing, logging and hooking around every dispatch
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use modelq::{qb, ModelRegistry, WhereExpr};
//!
//! let mut registry = ModelRegistry::new();
//! registry.register_entity::<Widget>(widget_backend);
//!
//! // All rows, decoded
//! let widgets: Vec<Widget> = qb::model::<Widget>(&registry)
//!     .where_eq("status", "active")
//!     .paginate(2, 25)
//!     .find_all()
//!     .await?;
//!
//! // Projection or exclusion
//! let rows = qb::model::<Widget>(&registry)
//!     .not("secret")
//!     .where_(WhereExpr::new().between("price", 10, 20))
//!     .find()
//!     .await?;
//!
//! // Aggregate
//! let total: Option<i64> = qb::model::<Widget>(&registry).count().await?;
//! ```

pub mod condition;
pub mod config;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod monitor;
pub mod qb;
pub mod registry;
pub mod row;

pub use condition::{Op, Predicate, PredicateMap, WhereExpr, merge_predicates};
pub use config::{DEFAULT_COUNT_ALIAS, QueryConfig};
pub use descriptor::{Aggregate, Attributes, QueryDescriptor, QueryKind, Selector};
pub use entity::{Entity, EntityDescriptor};
pub use error::{OrmError, OrmResult};
pub use monitor::{
    CompositeHook, CompositeMonitor, HookAction, InstrumentedBackend, MonitorConfig, NoopMonitor,
    QueryContext, QueryHook, QueryMonitor, QueryResult, QueryStats, StatsMonitor,
    TracingQueryHook,
};
pub use registry::{Backend, ModelRegistry};
pub use row::{FromRow, Row, RowExt};

// Re-export qb entry points for easy access
pub use qb::{ModelQuery, model, named, query};

/// Re-exported so backends can be implemented without a direct dependency.
pub use async_trait::async_trait;
