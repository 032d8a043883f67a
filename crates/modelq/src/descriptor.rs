//! Backend-neutral query descriptors.
//!
//! A [`QueryDescriptor`] is what the query builder hands to a
//! [`Backend`](crate::registry::Backend). It serializes to a plain JSON shape:
//!
//! ```text
//! {
//!   "attributes": ["id", ["price", "cost"]] | {"exclude": ["description"]},
//!   "where": {"status": "active", "price": {"$gt": 10}},
//!   "limit": 10,
//!   "offset": 20
//! }
//! ```
//!
//! Absent parts are omitted entirely.

use crate::condition::PredicateMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Aggregate function applied to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Function name, e.g. `COUNT`.
    #[serde(rename = "fn")]
    pub function: String,
    /// Column argument, `*` for all rows.
    #[serde(rename = "col")]
    pub column: String,
}

impl Aggregate {
    /// `COUNT(column)`
    pub fn count(column: impl Into<String>) -> Self {
        Self {
            function: "COUNT".to_string(),
            column: column.into(),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function, self.column)
    }
}

/// One projected column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selector {
    /// Bare column name: `"price"`
    Column(String),
    /// Column with alias: `["price", "cost"]`
    Aliased(String, String),
    /// Aggregate with alias: `[{"fn": "COUNT", "col": "*"}, "total"]`
    Aggregate(Aggregate, String),
}

impl Selector {
    /// The name the value appears under in result rows.
    pub fn output_name(&self) -> &str {
        match self {
            Selector::Column(name) => name,
            Selector::Aliased(_, alias) | Selector::Aggregate(_, alias) => alias,
        }
    }
}

/// Projection part of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attributes {
    /// Explicit ordered projection.
    List(Vec<Selector>),
    /// Every column except the listed ones.
    Exclude { exclude: Vec<String> },
}

impl Attributes {
    /// Whether this is the exclusion-object form.
    pub fn is_exclude(&self) -> bool {
        matches!(self, Attributes::Exclude { .. })
    }
}

/// Which terminal operation produced a descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Full-row fetch.
    FindAll,
    /// Projected or excluded fetch.
    Find,
    /// Aggregate count.
    Count,
    /// Built by hand.
    #[default]
    Other,
}

impl QueryKind {
    /// Short lowercase name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::FindAll => "find_all",
            QueryKind::Find => "find",
            QueryKind::Count => "count",
            QueryKind::Other => "other",
        }
    }
}

/// Compiled, backend-neutral query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Terminal operation that produced this descriptor. Not serialized.
    #[serde(skip)]
    pub kind: QueryKind,
    /// Projection, either a list or the exclusion form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    /// Merged filter map.
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_: Option<PredicateMap>,
    /// Row limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Rows to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl QueryDescriptor {
    /// Create an empty descriptor of the given kind.
    pub fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Whether nothing restricts the query.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_none()
            && self.where_.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
    }

    /// Alias of the first aggregate selector, if any.
    pub fn aggregate_alias(&self) -> Option<&str> {
        match &self.attributes {
            Some(Attributes::List(selectors)) => selectors.iter().find_map(|s| match s {
                Selector::Aggregate(_, alias) => Some(alias.as_str()),
                _ => None,
            }),
            _ => None,
        }
    }

    /// JSON form of the descriptor.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str("<unserializable descriptor>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_descriptor_serializes_to_empty_object() {
        let d = QueryDescriptor::new(QueryKind::FindAll);
        assert!(d.is_empty());
        assert_eq!(d.to_json(), json!({}));
    }

    #[test]
    fn test_selector_shapes() {
        let d = QueryDescriptor {
            attributes: Some(Attributes::List(vec![
                Selector::Column("id".into()),
                Selector::Aliased("price".into(), "cost".into()),
                Selector::Aggregate(Aggregate::count("*"), "total".into()),
            ])),
            ..Default::default()
        };
        assert_eq!(
            d.to_json(),
            json!({"attributes": ["id", ["price", "cost"], [{"fn": "COUNT", "col": "*"}, "total"]]})
        );
        assert_eq!(d.aggregate_alias(), Some("total"));
    }

    #[test]
    fn test_exclude_shape_and_where_key() {
        let mut filter = PredicateMap::new();
        filter.insert("status".into(), json!("active"));
        let d = QueryDescriptor {
            attributes: Some(Attributes::Exclude {
                exclude: vec!["description".into()],
            }),
            where_: Some(filter),
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(
            d.to_json(),
            json!({
                "attributes": {"exclude": ["description"]},
                "where": {"status": "active"},
                "limit": 0
            })
        );
    }

    #[test]
    fn test_deserialize_round_trips_shape() {
        let raw = json!({
            "attributes": ["name", ["price", "cost"]],
            "where": {"kind": "gear"},
            "offset": 5
        });
        let d: QueryDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(d.kind, QueryKind::Other);
        assert_eq!(d.offset, Some(5));
        assert_eq!(d.to_json(), raw);
    }

    #[test]
    fn test_aggregate_display() {
        assert_eq!(Aggregate::count("*").to_string(), "COUNT(*)");
    }
}
