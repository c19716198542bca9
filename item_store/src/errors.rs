use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error on {table} during {operation}: {source}")]
    DatabaseError {
        table: String,
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Query did not return a unique result: {count} rows matched")]
    NonUniqueResult { count: usize },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl StoreError {
    /// Wrap a driver error with the table and operation it happened in
    pub fn database_operation(table: &str, operation: &str, source: sqlx::Error) -> Self {
        Self::DatabaseError {
            table: table.to_string(),
            operation: operation.to_string(),
            source,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// True for errors raised by the database driver itself
    pub fn is_database_error(&self) -> bool {
        matches!(self, Self::DatabaseError { .. })
    }
}
