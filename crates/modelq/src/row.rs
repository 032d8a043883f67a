//! Row mapping traits and utilities

use crate::error::{OrmError, OrmResult};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A result row: column name → value, in backend column order.
pub type Row = Map<String, Value>;

/// Trait for converting a result row into a Rust type.
///
/// Every `DeserializeOwned` type gets an implementation, so deriving
/// `serde::Deserialize` on a model is enough to use it with
/// [`ModelQuery::find_all`](crate::qb::ModelQuery::find_all).
pub trait FromRow: Sized {
    /// Convert a row into this type.
    fn from_row(row: &Row) -> OrmResult<Self>;
}

impl<T: DeserializeOwned> FromRow for T {
    fn from_row(row: &Row) -> OrmResult<Self> {
        serde_json::from_value(Value::Object(row.clone()))
            .map_err(|e| OrmError::decode("<row>", e.to_string()))
    }
}

/// Extension trait for reading single values out of a [`Row`].
pub trait RowExt {
    /// Raw value of a column, if present.
    fn value(&self, column: &str) -> Option<&Value>;

    /// Decode a column into `T`.
    fn get_as<T: DeserializeOwned>(&self, column: &str) -> OrmResult<T>;
}

impl RowExt for Row {
    fn value(&self, column: &str) -> Option<&Value> {
        self.get(column)
    }

    fn get_as<T: DeserializeOwned>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| OrmError::decode(column, "column not present in row"))?;
        T::deserialize(value).map_err(|e| OrmError::decode(column, e.to_string()))
    }
}

/// Read an integer scalar, accepting numeric strings.
///
/// Some drivers hand back `COUNT(...)` (a bigint) as a string.
pub(crate) fn scalar_i64(row: &Row, column: &str) -> OrmResult<i64> {
    match row.value(column) {
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| OrmError::decode(column, e.to_string())),
        _ => row.get_as::<i64>(column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        id: i64,
        name: String,
    }

    #[test]
    fn test_from_row_deserializes_model() {
        let w = Widget::from_row(&row(json!({"id": 7, "name": "sprocket"}))).unwrap();
        assert_eq!(
            w,
            Widget {
                id: 7,
                name: "sprocket".into()
            }
        );
    }

    #[test]
    fn test_from_row_reports_decode_error() {
        let err = Widget::from_row(&row(json!({"id": "seven"}))).unwrap_err();
        assert!(matches!(err, OrmError::Decode { .. }));
    }

    #[test]
    fn test_get_as_missing_column() {
        let r = row(json!({"a": 1}));
        let err = r.get_as::<i64>("b").unwrap_err();
        assert!(err.to_string().contains("'b'"));
        assert_eq!(r.get_as::<i64>("a").unwrap(), 1);
    }

    #[test]
    fn test_scalar_i64_accepts_strings() {
        assert_eq!(scalar_i64(&row(json!({"n": "42"})), "n").unwrap(), 42);
        assert_eq!(scalar_i64(&row(json!({"n": 42})), "n").unwrap(), 42);
        assert!(scalar_i64(&row(json!({"n": "x"})), "n").is_err());
    }
}
