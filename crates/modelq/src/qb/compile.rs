//! Compilation of builder state into [`QueryDescriptor`]s.
//!
//! These functions are pure: they read the accumulated state and build a fresh
//! descriptor every time.

use crate::condition::{PredicateMap, merge_predicates};
use crate::descriptor::{Aggregate, Attributes, QueryDescriptor, QueryKind, Selector};

/// State accumulated by the fluent builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct QueryState {
    /// Projection in call order.
    pub(crate) attributes: Vec<Selector>,
    /// Excluded columns in call order.
    pub(crate) excludes: Vec<String>,
    /// Filter maps in call order.
    pub(crate) where_conditions: Vec<PredicateMap>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

impl QueryState {
    /// Whether any column was selected or excluded.
    pub(crate) fn has_projection(&self) -> bool {
        !self.attributes.is_empty() || !self.excludes.is_empty()
    }

    fn is_paginated(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    fn apply_paging_and_filter(&self, descriptor: &mut QueryDescriptor) {
        descriptor.limit = self.limit;
        descriptor.offset = self.offset;
        descriptor.where_ = merge_predicates(&self.where_conditions);
    }
}

/// Full-row query: pagination and filter only.
pub(crate) fn compile_simple(state: &QueryState) -> QueryDescriptor {
    let mut descriptor = QueryDescriptor::new(QueryKind::FindAll);
    state.apply_paging_and_filter(&mut descriptor);
    descriptor
}

/// Projected query.
///
/// Exclusions replace any explicit projection. When the query is paginated and
/// no explicit projection was requested, a list-form projection is dropped; the
/// exclusion form is always kept.
pub(crate) fn compile_complex(state: &QueryState) -> QueryDescriptor {
    let mut descriptor = QueryDescriptor::new(QueryKind::Find);

    if !state.attributes.is_empty() {
        descriptor.attributes = Some(Attributes::List(state.attributes.clone()));
    }

    if !state.excludes.is_empty() {
        descriptor.attributes = Some(Attributes::Exclude {
            exclude: state.excludes.clone(),
        });
    }

    if state.is_paginated()
        && state.attributes.is_empty()
        && matches!(descriptor.attributes, Some(Attributes::List(_)))
    {
        descriptor.attributes = None;
    }

    state.apply_paging_and_filter(&mut descriptor);
    descriptor
}

/// Bare `COUNT(column) AS alias` query. Filters and pagination are not applied.
pub(crate) fn compile_count(column: &str, alias: &str) -> QueryDescriptor {
    let mut descriptor = QueryDescriptor::new(QueryKind::Count);
    descriptor.attributes = Some(Attributes::List(vec![Selector::Aggregate(
        Aggregate::count(column),
        alias.to_string(),
    )]));
    descriptor
}
