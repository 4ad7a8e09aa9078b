//! Error types for the catalog store and command façade.

use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised by the catalog store. The command façade passes them through untouched.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog not initialized: {0}")]
    NotInitialized(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage error: {0}")]
    Storage(#[source] rusqlite::Error),

    #[error("Invalid catalog data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Stable name used in `serve` error envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::NotInitialized(_) => "NotInitialized",
            CatalogError::ConstraintViolation(_) => "ConstraintViolation",
            CatalogError::Storage(_) => "Storage",
            CatalogError::Serialization(_) => "Serialization",
            CatalogError::Io(_) => "Io",
        }
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                let detail = message
                    .clone()
                    .unwrap_or_else(|| failure.to_string());
                CatalogError::ConstraintViolation(detail)
            }
            _ => CatalogError::Storage(err),
        }
    }
}
