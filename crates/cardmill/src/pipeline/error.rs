use std::time::Duration;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::extractor::ExtractError;
use crate::generator::GenerateError;

/// Errors raised while running a job through the pipeline stages.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Text extraction timed out after {0:?}")]
    ExtractTimeout(Duration),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
