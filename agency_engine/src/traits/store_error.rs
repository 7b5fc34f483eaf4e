use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record {id} does not exist in {collection}")]
    RecordNotFound { collection: &'static str, id: i64 },
    #[error("Invalid data in {collection}: {reason}")]
    InvalidData { collection: &'static str, reason: String },
}

impl StoreError {
    pub fn not_found(collection: &'static str, id: i64) -> Self {
        Self::RecordNotFound { collection, id }
    }

    pub fn invalid_data<S: Into<String>>(collection: &'static str, reason: S) -> Self {
        Self::InvalidData { collection, reason: reason.into() }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}
