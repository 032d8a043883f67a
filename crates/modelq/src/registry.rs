//! Backend contract and the entity → backend registry.

use crate::descriptor::QueryDescriptor;
use crate::entity::{Entity, EntityDescriptor, canonical_name};
use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A handle able to execute compiled query descriptors.
///
/// Implementations own everything storage related (connections, dialects,
/// transactions). Failures should be returned as-is; the query builder does not
/// wrap or retry them. Use [`OrmError::backend`] to carry a driver error.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a descriptor and return the result rows.
    async fn execute_query(&self, descriptor: &QueryDescriptor) -> OrmResult<Vec<Row>>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn execute_query(&self, descriptor: &QueryDescriptor) -> OrmResult<Vec<Row>> {
        (**self).execute_query(descriptor).await
    }
}

/// Registry mapping entity names to backends.
///
/// Names are stored lowercase, so lookups are case-insensitive. Populate the
/// registry up front and share it by reference with query builders.
///
/// # Example
/// ```ignore
/// let mut registry = ModelRegistry::new();
/// registry.register_entity::<Widget>(widget_backend);
///
/// let widgets = modelq::qb::model::<Widget>(&registry)
///     .limit(10)
///     .find_all::<Widget>()
///     .await?;
/// ```
#[derive(Clone, Default)]
pub struct ModelRegistry {
    backends: HashMap<String, Arc<dyn Backend>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under a model name. Replaces any previous entry.
    pub fn register<B: Backend + 'static>(&mut self, name: &str, backend: B) {
        self.register_arc(name, Arc::new(backend));
    }

    /// Register a shared backend under a model name.
    pub fn register_arc(&mut self, name: &str, backend: Arc<dyn Backend>) {
        let name = canonical_name(name);
        tracing::debug!(target: "modelq.registry", entity = %name, "backend registered");
        self.backends.insert(name, backend);
    }

    /// Register a backend for an [`Entity`] type.
    pub fn register_entity<E: Entity + ?Sized>(&mut self, backend: impl Backend + 'static) {
        self.register(E::entity_name(), backend);
    }

    /// Builder form of [`ModelRegistry::register`].
    pub fn with_backend<B: Backend + 'static>(mut self, name: &str, backend: B) -> Self {
        self.register(name, backend);
        self
    }

    /// Look up the backend for an entity.
    ///
    /// Returns [`OrmError::ModelNotFound`] with the canonical name when nothing is
    /// registered for it.
    pub fn resolve(&self, entity: &EntityDescriptor) -> OrmResult<Arc<dyn Backend>> {
        match self.backends.get(entity.name()) {
            Some(backend) => Ok(Arc::clone(backend)),
            None => {
                tracing::debug!(target: "modelq.registry", entity = %entity, "no backend registered");
                Err(OrmError::ModelNotFound(entity.name().to_string()))
            }
        }
    }

    /// Whether a backend is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(&canonical_name(name))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}
