//! Error types for xcrud.

use thiserror::Error;

/// The main error type for insert statement construction.
#[derive(Debug, Error)]
pub enum CrudError {
    /// A projection was supplied for a document collection.
    #[error("Bad projection: {0}")]
    BadProjection(String),

    /// Required request data (rows) is absent.
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// Row data does not fit the target (field counts, upsert mode).
    #[error("Bad insert data: {0}")]
    BadInsertData(String),

    /// The collection reference has no usable name.
    #[error("Bad table: {0}")]
    BadTable(String),

    /// The generic expression renderer rejected an expression.
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// Server state is not what the builder needs.
    #[error("Internal error: {0}")]
    Internal(String),

    /// The session failed to execute a query.
    #[error("Session error: {0}")]
    Session(String),

    /// A request document could not be decoded.
    #[error("Invalid request: {0}")]
    Request(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrudError {
    /// Create a bad insert data error for a row of the wrong width.
    pub fn wrong_field_count() -> Self {
        Self::BadInsertData("Wrong number of fields in row being inserted".into())
    }

    /// Create a missing argument error for an insert without rows.
    pub fn missing_rows() -> Self {
        Self::MissingArgument("Missing row data for Insert".into())
    }

    /// Whether the error was caused by the request rather than the server.
    ///
    /// Client errors are safe to report back verbatim; the rest point at a
    /// misconfigured server or a broken session.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::BadProjection(_)
                | Self::MissingArgument(_)
                | Self::BadInsertData(_)
                | Self::BadTable(_)
                | Self::InvalidExpression(_)
                | Self::Request(_)
        )
    }
}

impl From<serde_json::Error> for CrudError {
    fn from(e: serde_json::Error) -> Self {
        Self::Request(e.to_string())
    }
}

impl From<sqlx::Error> for CrudError {
    fn from(e: sqlx::Error) -> Self {
        Self::Session(e.to_string())
    }
}

/// Result type alias for xcrud operations.
pub type CrudResult<T> = Result<T, CrudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CrudError::wrong_field_count();
        assert_eq!(
            err.to_string(),
            "Bad insert data: Wrong number of fields in row being inserted"
        );
    }

    #[test]
    fn test_client_vs_server_errors() {
        assert!(CrudError::missing_rows().is_client_error());
        assert!(CrudError::BadProjection("x".into()).is_client_error());
        assert!(!CrudError::Internal("Error executing statement".into()).is_client_error());
        assert!(!CrudError::Session("gone away".into()).is_client_error());
    }
}
