//! Error types for modelq

use thiserror::Error;

/// Result type alias for modelq operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query composition and dispatch
#[derive(Debug, Error)]
pub enum OrmError {
    /// The builder was never bound to an entity
    #[error("Class not found: query builder is not bound to an entity")]
    ClassNotFound,

    /// No backend is registered under the entity name
    #[error("Model not found: no backend registered for '{0}'")]
    ModelNotFound(String),

    /// A terminal operation was called that does not match the builder state
    #[error("Wrong method invoked: `{method}()` cannot be used here, use `{instead}()` instead")]
    WrongMethodInvoked {
        method: &'static str,
        instead: &'static str,
    },

    /// The operation exists on the API but is not available
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// Error raised by a backend while executing a descriptor
    #[error("Backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A query hook refused to dispatch the query
    #[error("Query aborted: {0}")]
    Aborted(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a wrong-method error naming the operation that should be used instead
    pub fn wrong_method(method: &'static str, instead: &'static str) -> Self {
        Self::WrongMethodInvoked { method, instead }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Wrap a backend failure
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }

    /// Check if this is a class-not-found error
    pub fn is_class_not_found(&self) -> bool {
        matches!(self, Self::ClassNotFound)
    }

    /// Check if this is a model-not-found error
    pub fn is_model_not_found(&self) -> bool {
        matches!(self, Self::ModelNotFound(_))
    }

    /// Check if this is a wrong-method error
    pub fn is_wrong_method(&self) -> bool {
        matches!(self, Self::WrongMethodInvoked { .. })
    }

    /// Check if this is a not-implemented error
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented(_))
    }
}

impl From<toml::de::Error> for OrmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
