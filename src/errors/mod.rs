// Error types for the store boundary and the handler boundary, built on thiserror.
use thiserror::Error;

pub mod response;
pub mod store;

pub use store::{StoreError, StoreResult};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    // Store errors that reach this point were not recoverable by the handler.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Invalid or missing CSRF token")]
    Csrf,

    #[error("Page not found")]
    NotFound,
}

pub type AppResult<T> = Result<T, AppError>;
