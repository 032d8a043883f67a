//! Model query builder.
//!
//! A [`ModelQuery`] collects projection, filter and pagination calls and compiles
//! them into a [`QueryDescriptor`](crate::descriptor::QueryDescriptor) that is
//! dispatched to the backend registered for the entity.
//!
//! # Usage
//!
//! ```ignore
//! use modelq::{qb, ModelRegistry, WhereExpr};
//!
//! let registry: ModelRegistry = build_registry();
//!
//! // Full rows
//! let widgets: Vec<Widget> = qb::model::<Widget>(&registry)
//!     .where_eq("status", "active")
//!     .limit(20)
//!     .find_all()
//!     .await?;
//!
//! // Projection
//! let rows = qb::model::<Widget>(&registry)
//!     .column("id")
//!     .column_as("price", "cost")
//!     .where_(WhereExpr::new().gte("price", 10))
//!     .find()
//!     .await?;
//!
//! // Aggregate
//! let total = qb::model::<Widget>(&registry).count().await?;
//! ```

mod compile;
mod model;

pub use model::ModelQuery;

use crate::entity::{Entity, EntityDescriptor};
use crate::registry::ModelRegistry;

/// Create a query builder bound to an [`Entity`] type.
///
/// # Example
/// ```ignore
/// let qb = modelq::qb::model::<Widget>(&registry).limit(10);
/// ```
pub fn model<E: Entity + ?Sized>(registry: &ModelRegistry) -> ModelQuery<'_> {
    ModelQuery::for_entity::<E>(registry)
}

/// Create a query builder bound to a model by name.
///
/// # Example
/// ```ignore
/// let qb = modelq::qb::named(&registry, "Widget").column("id");
/// ```
pub fn named<'r>(registry: &'r ModelRegistry, name: &str) -> ModelQuery<'r> {
    ModelQuery::new(registry).bind(EntityDescriptor::named(name.to_string()))
}

/// Create a query builder that is not bound to an entity yet.
pub fn query(registry: &ModelRegistry) -> ModelQuery<'_> {
    ModelQuery::new(registry)
}
