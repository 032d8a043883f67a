//! Predicate types for filtering queries.
//!
//! A filter is expressed as a [`PredicateMap`]: a flat, insertion-ordered map of
//! column name to JSON value. Plain values mean equality; operator objects such as
//! `{"$gt": 18}` (produced by [`Op`]) carry comparisons.
//!
//! [`WhereExpr`] is a small builder over [`Op`] for assembling operator conditions,
//! and [`Predicate`] is what [`ModelQuery::where_`](crate::qb::ModelQuery::where_)
//! accepts: either a ready map or an expression that is flattened into one.

use serde_json::{Map, Value};

/// A flat key → value filter map. Keys keep insertion order.
pub type PredicateMap = Map<String, Value>;

/// Query operator for building conditions.
///
/// # Example
/// ```ignore
/// use modelq::Op;
///
/// Op::eq("active");
/// Op::gt(100);
/// Op::ilike("%widget%");
/// Op::<i64>::is_null();
/// Op::in_list(vec![1, 2, 3]);
/// Op::between(10, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Op<T> {
    /// Equal: column = value
    Eq(T),
    /// Not equal: column != value
    Ne(T),
    /// Greater than: column > value
    Gt(T),
    /// Greater than or equal: column >= value
    Gte(T),
    /// Less than: column < value
    Lt(T),
    /// Less than or equal: column <= value
    Lte(T),
    /// LIKE pattern match
    Like(T),
    /// Case-insensitive LIKE
    Ilike(T),
    /// NOT LIKE pattern match
    NotLike(T),
    /// NOT ILIKE pattern match
    NotIlike(T),
    /// IS NULL
    IsNull,
    /// IS NOT NULL
    IsNotNull,
    /// IN (list)
    In(Vec<T>),
    /// NOT IN (list)
    NotIn(Vec<T>),
    /// BETWEEN a AND b
    Between(T, T),
    /// NOT BETWEEN a AND b
    NotBetween(T, T),
}

impl<T> Op<T> {
    /// Create an equality condition.
    pub fn eq(val: T) -> Self {
        Op::Eq(val)
    }

    /// Create a not-equal condition.
    pub fn ne(val: T) -> Self {
        Op::Ne(val)
    }

    /// Create a greater-than condition.
    pub fn gt(val: T) -> Self {
        Op::Gt(val)
    }

    /// Create a greater-than-or-equal condition.
    pub fn gte(val: T) -> Self {
        Op::Gte(val)
    }

    /// Create a less-than condition.
    pub fn lt(val: T) -> Self {
        Op::Lt(val)
    }

    /// Create a less-than-or-equal condition.
    pub fn lte(val: T) -> Self {
        Op::Lte(val)
    }

    /// Create a LIKE pattern match condition.
    pub fn like(val: T) -> Self {
        Op::Like(val)
    }

    /// Create a case-insensitive pattern match condition.
    pub fn ilike(val: T) -> Self {
        Op::Ilike(val)
    }

    /// Create a NOT LIKE pattern match condition.
    pub fn not_like(val: T) -> Self {
        Op::NotLike(val)
    }

    /// Create a NOT ILIKE pattern match condition.
    pub fn not_ilike(val: T) -> Self {
        Op::NotIlike(val)
    }

    /// Create an IS NULL condition.
    pub fn is_null() -> Self {
        Op::IsNull
    }

    /// Create an IS NOT NULL condition.
    pub fn is_not_null() -> Self {
        Op::IsNotNull
    }

    /// Create an IN (list) condition.
    pub fn in_list(vals: Vec<T>) -> Self {
        Op::In(vals)
    }

    /// Create a NOT IN (list) condition.
    pub fn not_in(vals: Vec<T>) -> Self {
        Op::NotIn(vals)
    }

    /// Create a BETWEEN condition.
    pub fn between(from: T, to: T) -> Self {
        Op::Between(from, to)
    }

    /// Create a NOT BETWEEN condition.
    pub fn not_between(from: T, to: T) -> Self {
        Op::NotBetween(from, to)
    }
}

impl<T: Into<Value>> Op<T> {
    /// Convert into the value stored under a column key.
    ///
    /// Equality is the bare value; every other operator becomes a one-key
    /// operator object, e.g. `{"$gt": 18}`.
    pub fn into_value(self) -> Value {
        let (key, value) = match self {
            Op::Eq(v) => return v.into(),
            Op::Ne(v) => ("$ne", v.into()),
            Op::Gt(v) => ("$gt", v.into()),
            Op::Gte(v) => ("$gte", v.into()),
            Op::Lt(v) => ("$lt", v.into()),
            Op::Lte(v) => ("$lte", v.into()),
            Op::Like(v) => ("$like", v.into()),
            Op::Ilike(v) => ("$iLike", v.into()),
            Op::NotLike(v) => ("$notLike", v.into()),
            Op::NotIlike(v) => ("$notILike", v.into()),
            Op::IsNull => ("$is", Value::Null),
            Op::IsNotNull => ("$not", Value::Null),
            Op::In(vals) => ("$in", list(vals)),
            Op::NotIn(vals) => ("$notIn", list(vals)),
            Op::Between(from, to) => ("$between", Value::Array(vec![from.into(), to.into()])),
            Op::NotBetween(from, to) => {
                ("$notBetween", Value::Array(vec![from.into(), to.into()]))
            }
        };

        let mut obj = Map::new();
        obj.insert(key.to_string(), value);
        Value::Object(obj)
    }
}

fn list<T: Into<Value>>(vals: Vec<T>) -> Value {
    Value::Array(vals.into_iter().map(Into::into).collect())
}

fn is_operator_value(value: &Value) -> bool {
    match value {
        Value::Object(obj) => !obj.is_empty() && obj.keys().all(|k| k.starts_with('$')),
        _ => false,
    }
}

/// Operator-expression builder.
///
/// Collects `column → operator` conditions into an inner map. Two operators on the
/// same column are combined into one operator object
/// (`{"price": {"$gte": 10, "$lt": 20}}`); any other repeat overwrites.
///
/// # Example
/// ```ignore
/// use modelq::WhereExpr;
///
/// let expr = WhereExpr::new()
///     .eq("status", "active")
///     .gte("price", 10)
///     .lt("price", 20);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereExpr {
    expr: PredicateMap,
}

impl WhereExpr {
    /// Create an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition on `column`.
    pub fn op<T: Into<Value>>(mut self, column: &str, op: Op<T>) -> Self {
        let value = op.into_value();
        let combine = is_operator_value(&value)
            && self.expr.get(column).is_some_and(is_operator_value);
        if combine {
            if let (Some(Value::Object(existing)), Value::Object(incoming)) =
                (self.expr.get_mut(column), value)
            {
                existing.extend(incoming);
            }
        } else {
            self.expr.insert(column.to_string(), value);
        }
        self
    }

    /// column = value
    pub fn eq<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.op(column, Op::Eq(value))
    }

    /// column != value
    pub fn ne<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.op(column, Op::Ne(value))
    }

    /// column > value
    pub fn gt<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.op(column, Op::Gt(value))
    }

    /// column >= value
    pub fn gte<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.op(column, Op::Gte(value))
    }

    /// column < value
    pub fn lt<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.op(column, Op::Lt(value))
    }

    /// column <= value
    pub fn lte<T: Into<Value>>(self, column: &str, value: T) -> Self {
        self.op(column, Op::Lte(value))
    }

    /// column LIKE pattern
    pub fn like<T: Into<Value>>(self, column: &str, pattern: T) -> Self {
        self.op(column, Op::Like(pattern))
    }

    /// column ILIKE pattern
    pub fn ilike<T: Into<Value>>(self, column: &str, pattern: T) -> Self {
        self.op(column, Op::Ilike(pattern))
    }

    /// column IS NULL
    pub fn is_null(self, column: &str) -> Self {
        self.op(column, Op::<Value>::IsNull)
    }

    /// column IS NOT NULL
    pub fn is_not_null(self, column: &str) -> Self {
        self.op(column, Op::<Value>::IsNotNull)
    }

    /// column IN (values...)
    pub fn in_list<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.op(column, Op::In(values))
    }

    /// column NOT IN (values...)
    pub fn not_in<T: Into<Value>>(self, column: &str, values: Vec<T>) -> Self {
        self.op(column, Op::NotIn(values))
    }

    /// column BETWEEN from AND to
    pub fn between<T: Into<Value>>(self, column: &str, from: T, to: T) -> Self {
        self.op(column, Op::Between(from, to))
    }

    /// Add the condition only when `value` is `Some`.
    pub fn eq_opt<T: Into<Value>>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    /// Whether no conditions were added.
    pub fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    /// Borrow the underlying expression map.
    pub fn as_map(&self) -> &PredicateMap {
        &self.expr
    }

    /// Unwrap into the underlying expression map.
    pub fn into_map(self) -> PredicateMap {
        self.expr
    }
}

/// A filter accepted by the query builder.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A plain key → value map.
    Map(PredicateMap),
    /// An operator expression, flattened with [`WhereExpr::into_map`].
    Expr(WhereExpr),
}

impl Predicate {
    /// Resolve to the plain map form.
    pub fn into_map(self) -> PredicateMap {
        match self {
            Predicate::Map(map) => map,
            Predicate::Expr(expr) => expr.into_map(),
        }
    }
}

impl From<PredicateMap> for Predicate {
    fn from(map: PredicateMap) -> Self {
        Predicate::Map(map)
    }
}

impl From<WhereExpr> for Predicate {
    fn from(expr: WhereExpr) -> Self {
        Predicate::Expr(expr)
    }
}

/// Merge predicate maps left to right.
///
/// A key written by a later map overwrites the value from an earlier one.
/// Returns `None` when `maps` is empty so callers never emit an empty `where`.
pub fn merge_predicates(maps: &[PredicateMap]) -> Option<PredicateMap> {
    if maps.is_empty() {
        return None;
    }

    let mut merged = PredicateMap::new();
    for map in maps {
        for (key, value) in map {
            merged.insert(key.clone(), value.clone());
        }
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> PredicateMap {
        match value {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_op_values() {
        assert_eq!(Op::eq("a").into_value(), json!("a"));
        assert_eq!(Op::gt(5).into_value(), json!({"$gt": 5}));
        assert_eq!(Op::<i64>::is_null().into_value(), json!({"$is": null}));
        assert_eq!(Op::<i64>::is_not_null().into_value(), json!({"$not": null}));
        assert_eq!(Op::in_list(vec![1, 2]).into_value(), json!({"$in": [1, 2]}));
        assert_eq!(
            Op::not_between(1, 9).into_value(),
            json!({"$notBetween": [1, 9]})
        );
        assert_eq!(Op::ilike("%x%").into_value(), json!({"$iLike": "%x%"}));
    }

    #[test]
    fn test_where_expr_combines_operators_on_same_column() {
        let expr = WhereExpr::new().gte("price", 10).lt("price", 20);
        assert_eq!(
            Value::Object(expr.into_map()),
            json!({"price": {"$gte": 10, "$lt": 20}})
        );
    }

    #[test]
    fn test_where_expr_equality_overwrites() {
        let expr = WhereExpr::new().gt("age", 18).eq("age", 30);
        assert_eq!(Value::Object(expr.into_map()), json!({"age": 30}));
    }

    #[test]
    fn test_where_expr_eq_opt() {
        let expr = WhereExpr::new()
            .eq_opt("status", Some("active"))
            .eq_opt::<&str>("name", None);
        assert_eq!(Value::Object(expr.into_map()), json!({"status": "active"}));
    }

    #[test]
    fn test_predicate_unwraps_expression() {
        let p: Predicate = WhereExpr::new().eq("kind", "gear").into();
        assert_eq!(Value::Object(p.into_map()), json!({"kind": "gear"}));
    }

    #[test]
    fn test_merge_empty_is_none() {
        assert!(merge_predicates(&[]).is_none());
    }

    #[test]
    fn test_merge_later_wins() {
        let merged = merge_predicates(&[
            map(json!({"status": "active", "kind": "gear"})),
            map(json!({"status": "pending"})),
        ])
        .unwrap();
        assert_eq!(
            Value::Object(merged.clone()),
            json!({"status": "pending", "kind": "gear"})
        );
        let keys: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, ["status", "kind"]);
    }

    #[test]
    fn test_merge_single_empty_map_is_present() {
        let merged = merge_predicates(&[PredicateMap::new()]);
        assert_eq!(merged, Some(PredicateMap::new()));
    }
}
