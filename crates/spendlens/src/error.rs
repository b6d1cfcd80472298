//! Error types for spendlens

use thiserror::Error;

/// Result type alias for spendlens operations
pub type SpendResult<T> = Result<T, SpendError>;

/// Error types for statement building and expense operations
#[derive(Debug, Error)]
pub enum SpendError {
    /// Statement kind is not one of SELECT/INSERT/UPDATE/DELETE
    #[error("Unsupported statement kind: {0}")]
    UnsupportedStatementKind(String),

    /// Operator received a value it cannot render (e.g. BETWEEN without exactly two bounds)
    #[error("Invalid value for operator {operator}: {message}")]
    InvalidOperatorValue { operator: String, message: String },

    /// A statement kind needs an argument that was not supplied
    #[error("Missing argument '{0}'")]
    MissingArgument(&'static str),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The warehouse could not accept the job
    #[error("Warehouse error: {0}")]
    Warehouse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpendError {
    /// Create an invalid operator value error
    pub fn invalid_operator_value(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOperatorValue {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a warehouse error
    pub fn warehouse(message: impl Into<String>) -> Self {
        Self::Warehouse(message.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is an unsupported statement kind error
    pub fn is_unsupported_statement_kind(&self) -> bool {
        matches!(self, Self::UnsupportedStatementKind(_))
    }

    /// Check if this is an invalid operator value error
    pub fn is_invalid_operator_value(&self) -> bool {
        matches!(self, Self::InvalidOperatorValue { .. })
    }
}
