use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error types for knowledge base and conversation storage
#[derive(Debug, Error)]
pub enum StoreError {
    /// Invalid configuration or input
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Database unreachable or pool could not be built
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// No row matched the given id
    #[error("Not found: {0}")]
    NotFound(String),

    /// SQL errors, constraint violations
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Connection pool issues
    #[error("Pool error: {0}")]
    PoolError(String),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_error) = err.as_db_error() {
            return StoreError::DatabaseError(format!(
                "{}: {}",
                db_error.code().code(),
                db_error.message()
            ));
        }

        StoreError::DatabaseError(format!("{:?}", err))
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::PoolError(err.to_string())
    }
}

impl From<deadpool_postgres::BuildError> for StoreError {
    fn from(err: deadpool_postgres::BuildError) -> Self {
        StoreError::ConnectionError(err.to_string())
    }
}
