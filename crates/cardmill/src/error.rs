//! Crate-wide error type for callers that mix facade and database calls.
//!
//! Library code returns the per-module errors; this umbrella exists so
//! downstream code can `?` through `Database::open` and `DeckService`
//! calls in one function, as the README example does.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardmillError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Extraction error: {0}")]
    Extract(#[from] crate::extractor::ExtractError),

    #[error("Generation error: {0}")]
    Generate(#[from] crate::generator::GenerateError),

    #[error("Service error: {0}")]
    Service(#[from] crate::service::ServiceError),
}

pub type Result<T> = std::result::Result<T, CardmillError>;
