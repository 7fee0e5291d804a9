//! Error types for pgfilter

use thiserror::Error;

/// Result type alias for pgfilter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Error types for composition and execution
#[derive(Debug, Error)]
pub enum FilterError {
    /// A membership filter received something other than a list.
    ///
    /// This is an integration error: upstream validation hands the composer typed values.
    #[error("Input shape error on '{column}': expected a list, got {found}")]
    InputShape { column: String, found: &'static str },

    /// A filter argument could not be mapped onto a known set of values.
    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl FilterError {
    /// Create an input shape error for a specific column
    pub fn input_shape(column: impl Into<String>, found: &'static str) -> Self {
        Self::InputShape {
            column: column.into(),
            found,
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is an input shape error
    pub fn is_input_shape(&self) -> bool {
        matches!(self, Self::InputShape { .. })
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
