//! Fluent model query builder.

use crate::condition::{Predicate, PredicateMap};
use crate::config::{QueryConfig, truncate_for_log};
use crate::descriptor::{QueryDescriptor, Selector};
use crate::entity::{Entity, EntityDescriptor};
use crate::error::{OrmError, OrmResult};
use crate::qb::compile::{QueryState, compile_complex, compile_count, compile_simple};
use crate::registry::ModelRegistry;
use crate::row::{FromRow, Row, scalar_i64};
use serde_json::Value;

/// Fluent query builder bound to one entity.
///
/// Setters accumulate state and ignore empty input, so they can be chained
/// unconditionally. A query ends with exactly one terminal call:
///
/// - [`find_all`](Self::find_all): full rows, decoded into `T`. Not allowed after
///   [`column`](Self::column) / [`not`](Self::not).
/// - [`find`](Self::find): projected rows. Requires at least one
///   `column` / `not` call.
/// - [`count`](Self::count): bare aggregate count.
///
/// Terminal calls consume the builder. The backend is looked up in the registry
/// on every terminal call.
///
/// # Example
/// ```ignore
/// let rows = modelq::qb::model::<Widget>(&registry)
///     .column("id")
///     .column_as("price", "cost")
///     .where_(WhereExpr::new().gt("price", 10))
///     .limit(20)
///     .find()
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct ModelQuery<'r> {
    registry: &'r ModelRegistry,
    entity: Option<EntityDescriptor>,
    state: QueryState,
    config: QueryConfig,
}

impl<'r> ModelQuery<'r> {
    /// Create a builder that is not bound to any entity yet.
    pub fn new(registry: &'r ModelRegistry) -> Self {
        Self {
            registry,
            entity: None,
            state: QueryState::default(),
            config: QueryConfig::default(),
        }
    }

    /// Create a builder bound to an [`Entity`] type.
    pub fn for_entity<E: Entity + ?Sized>(registry: &'r ModelRegistry) -> Self {
        Self::new(registry).bind(EntityDescriptor::of::<E>())
    }

    /// Bind the builder to an entity.
    pub fn bind(mut self, entity: EntityDescriptor) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Bind the builder to an [`Entity`] type.
    pub fn bind_entity<E: Entity + ?Sized>(self) -> Self {
        self.bind(EntityDescriptor::of::<E>())
    }

    /// Use a specific configuration.
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// The bound entity, if any.
    pub fn entity(&self) -> Option<&EntityDescriptor> {
        self.entity.as_ref()
    }

    // ==================== Projection ====================

    /// Select a column. Ignored if `name` is empty.
    pub fn column(mut self, name: &str) -> Self {
        if !name.is_empty() {
            self.state.attributes.push(Selector::Column(name.to_string()));
        }
        self
    }

    /// Select a column under an alias. Ignored if `name` is empty; an empty
    /// alias selects the bare column.
    pub fn column_as(mut self, name: &str, alias: &str) -> Self {
        if name.is_empty() {
            return self;
        }
        let selector = if alias.is_empty() {
            Selector::Column(name.to_string())
        } else {
            Selector::Aliased(name.to_string(), alias.to_string())
        };
        self.state.attributes.push(selector);
        self
    }

    /// Select a column if `name` is `Some`.
    pub fn column_opt(self, name: Option<&str>) -> Self {
        match name {
            Some(name) => self.column(name),
            None => self,
        }
    }

    /// Select several columns in order.
    pub fn columns(self, names: &[&str]) -> Self {
        names.iter().fold(self, |qb, name| qb.column(name))
    }

    /// Exclude a column from the result. Ignored if `name` is empty.
    pub fn not(mut self, name: &str) -> Self {
        if !name.is_empty() {
            self.state.excludes.push(name.to_string());
        }
        self
    }

    /// Exclude several columns in order.
    pub fn not_cols(self, names: &[&str]) -> Self {
        names.iter().fold(self, |qb, name| qb.not(name))
    }

    // ==================== Filters ====================

    /// Add a filter map or operator expression.
    ///
    /// Filters are merged key by key when the query is compiled; a later filter
    /// overwrites an earlier one on the same key.
    pub fn where_(mut self, conditions: impl Into<Predicate>) -> Self {
        self.state.where_conditions.push(conditions.into().into_map());
        self
    }

    /// Add a filter if `conditions` is `Some`.
    pub fn where_opt<P: Into<Predicate>>(self, conditions: Option<P>) -> Self {
        match conditions {
            Some(conditions) => self.where_(conditions),
            None => self,
        }
    }

    /// Add a single `column = value` filter. Ignored if `column` is empty.
    pub fn where_eq(self, column: &str, value: impl Into<Value>) -> Self {
        if column.is_empty() {
            return self;
        }
        let mut map = PredicateMap::new();
        map.insert(column.to_string(), value.into());
        self.where_(map)
    }

    /// Add a filter from a JSON object. `null` is ignored, as is anything that
    /// is not an object.
    pub fn where_json(self, conditions: Value) -> Self {
        match conditions {
            Value::Object(map) => self.where_(map),
            Value::Null => self,
            other => {
                tracing::debug!(
                    target: "modelq.query",
                    value = %other,
                    "ignoring non-object filter"
                );
                self
            }
        }
    }

    // ==================== Pagination ====================

    /// Set LIMIT. Zero is kept as a real limit.
    pub fn limit(mut self, n: u64) -> Self {
        self.state.limit = Some(n);
        self
    }

    /// Set LIMIT if `n` is `Some`; otherwise keep the current value.
    pub fn limit_opt(self, n: Option<u64>) -> Self {
        match n {
            Some(n) => self.limit(n),
            None => self,
        }
    }

    /// Set OFFSET. Zero is kept as a real offset.
    pub fn offset(mut self, n: u64) -> Self {
        self.state.offset = Some(n);
        self
    }

    /// Set OFFSET if `n` is `Some`; otherwise keep the current value.
    pub fn offset_opt(self, n: Option<u64>) -> Self {
        match n {
            Some(n) => self.offset(n),
            None => self,
        }
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
        let p = page.max(1);
        let size = per_page.max(1);
        self.state.limit = Some(size);
        self.state.offset = Some((p - 1).saturating_mul(size));
        self
    }

    // ==================== Unsupported ====================

    /// Ordering is not supported by this builder.
    pub fn order(self, clause: &str) -> OrmResult<Self> {
        let _ = clause;
        Err(OrmError::NotImplemented("order"))
    }

    /// Raw queries are not supported by this builder.
    pub fn raw(self, sql: &str) -> OrmResult<Self> {
        let _ = sql;
        Err(OrmError::NotImplemented("raw"))
    }

    // ==================== Debug helpers ====================

    /// Descriptor that [`find_all`](Self::find_all) would dispatch.
    pub fn to_find_all_descriptor(&self) -> QueryDescriptor {
        compile_simple(&self.state)
    }

    /// Descriptor that [`find`](Self::find) would dispatch.
    pub fn to_find_descriptor(&self) -> QueryDescriptor {
        compile_complex(&self.state)
    }

    /// Descriptor that [`count_with`](Self::count_with) would dispatch.
    pub fn to_count_descriptor(
        &self,
        column: Option<&str>,
        alias: Option<&str>,
    ) -> QueryDescriptor {
        let (column, alias) = self.count_target(column, alias);
        compile_count(column, alias)
    }

    // ==================== Execution ====================

    /// Fetch full rows decoded into `T`.
    ///
    /// # Errors
    /// - [`OrmError::ClassNotFound`] if the builder is not bound.
    /// - [`OrmError::WrongMethodInvoked`] if columns were selected or excluded; use
    ///   [`find`](Self::find).
    /// - [`OrmError::ModelNotFound`] if no backend is registered for the entity.
    pub async fn find_all<T: FromRow>(self) -> OrmResult<Vec<T>> {
        let entity = self.bound_entity()?;
        if self.state.has_projection() {
            return Err(OrmError::wrong_method("find_all", "find"));
        }
        let backend = self.registry.resolve(entity)?;

        let descriptor = compile_simple(&self.state);
        self.log_dispatch(entity, &descriptor);
        let rows = backend.execute_query(&descriptor).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Fetch projected rows.
    ///
    /// # Errors
    /// - [`OrmError::ClassNotFound`] if the builder is not bound.
    /// - [`OrmError::WrongMethodInvoked`] if no column was selected or excluded; use
    ///   [`find_all`](Self::find_all).
    /// - [`OrmError::ModelNotFound`] if no backend is registered for the entity.
    pub async fn find(self) -> OrmResult<Vec<Row>> {
        let entity = self.bound_entity()?;
        if !self.state.has_projection() {
            return Err(OrmError::wrong_method("find", "find_all"));
        }
        let backend = self.registry.resolve(entity)?;

        let descriptor = compile_complex(&self.state);
        self.log_dispatch(entity, &descriptor);
        backend.execute_query(&descriptor).await
    }

    /// `COUNT(*)` under the configured alias. See [`count_with`](Self::count_with).
    pub async fn count(self) -> OrmResult<Option<i64>> {
        self.count_with(None, None).await
    }

    /// `COUNT(column) AS alias`.
    ///
    /// A missing or blank `column` counts `*`; a missing or blank `alias` uses
    /// [`QueryConfig::count_alias`]. Returns `None` when the backend returns no
    /// rows.
    ///
    /// A first row without the alias column is a decode failure
    /// ([`OrmError::Decode`]), not `None`; only an empty result means "no count".
    ///
    /// The count is not filtered: filters and pagination set on the builder are
    /// not part of the aggregate query.
    pub async fn count_with(
        self,
        column: Option<&str>,
        alias: Option<&str>,
    ) -> OrmResult<Option<i64>> {
        let entity = self.bound_entity()?;
        let backend = self.registry.resolve(entity)?;

        let (column, alias) = self.count_target(column, alias);
        let descriptor = compile_count(column, alias);
        self.log_dispatch(entity, &descriptor);
        let rows = backend.execute_query(&descriptor).await?;
        rows.first().map(|row| scalar_i64(row, alias)).transpose()
    }

    fn bound_entity(&self) -> OrmResult<&EntityDescriptor> {
        self.entity.as_ref().ok_or(OrmError::ClassNotFound)
    }

    fn count_target<'a>(
        &'a self,
        column: Option<&'a str>,
        alias: Option<&'a str>,
    ) -> (&'a str, &'a str) {
        let column = column.filter(|c| !c.trim().is_empty()).unwrap_or("*");
        let alias = alias
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(self.config.count_alias.as_str());
        (column, alias)
    }

    fn log_dispatch(&self, entity: &EntityDescriptor, descriptor: &QueryDescriptor) {
        if !self.config.log_descriptors {
            return;
        }
        let rendered = truncate_for_log(&descriptor.to_string(), self.config.max_logged_len);
        tracing::debug!(
            target: "modelq.query",
            entity = %entity,
            method = descriptor.kind.as_str(),
            descriptor = %rendered,
            "dispatching query"
        );
    }
}
