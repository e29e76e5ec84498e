use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Username {0} is already taken")]
    DuplicateUsername(String),

    // A missing task and another user's task are deliberately the same error.
    #[error("Task not found for this user")]
    NotOwned,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    Hashing(String),
}

impl StoreError {
    /// Persistence failures the user can retry; the transaction was rolled back.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Database(_) | StoreError::Hashing(_))
    }
}

impl From<bcrypt::BcryptError> for StoreError {
    fn from(e: bcrypt::BcryptError) -> Self {
        StoreError::Hashing(e.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Hashing(format!("hashing task failed: {}", e))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
