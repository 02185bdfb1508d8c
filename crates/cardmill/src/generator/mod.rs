//! Content generation against a generative backend.
//!
//! The backend itself is an external collaborator behind the
//! `GenerativeBackend` trait; this module owns prompt construction, the
//! structured-output parsing, the dedup/top-up loop and its deliberately
//! asymmetric failure policy (first pass fatal, top-ups tolerated).

pub mod content;
pub mod prompt;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use content::{ContentGenerator, ContentTargets, GeneratedContent};

/// One request to the generative backend: behavioral instructions plus a
/// payload, bounded by an output-token budget. `schema` describes the JSON
/// shape the response must parse into, for backends that support
/// structured output natively; the instructions restate it for those that
/// do not.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub instructions: String,
    pub payload: String,
    pub schema: serde_json::Value,
    pub max_tokens: u32,
}

/// Errors surfaced by a backend implementation.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    Request(String),

    #[error("Backend returned an empty response")]
    Empty,
}

/// Contract for the generative model. Implementations live outside the
/// core; tests use a scripted mock.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Returns raw model text from which a JSON object can be scanned out.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;
}

/// Errors from the generation stage.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Generation backend failed: {0}")]
    Backend(#[from] BackendError),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Backend returned no parsable deck: {0}")]
    UnparsableDeck(String),

    #[error("Backend returned an empty deck")]
    EmptyDeck,
}

// ─── Draft types (backend wire shape) ───────────────────────────────────────

/// A flashcard as returned by the backend, before ids are stamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftCard {
    pub question: String,
    pub answer: String,
}

/// An mcq as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMcq {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

/// The full-deck structured result of the first generation pass.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cards: Vec<DraftCard>,
    #[serde(default)]
    pub mcqs: Vec<DraftMcq>,
    #[serde(default)]
    pub plan: Vec<String>,
}

/// Structured result of a cards-only top-up request.
#[derive(Debug, Deserialize)]
pub struct CardsDraft {
    #[serde(default)]
    pub cards: Vec<DraftCard>,
}

/// Structured result of an mcqs-only top-up request.
#[derive(Debug, Deserialize)]
pub struct McqsDraft {
    #[serde(default)]
    pub mcqs: Vec<DraftMcq>,
}

/// Structured result of a plan-only request.
#[derive(Debug, Deserialize)]
pub struct PlanDraft {
    #[serde(default)]
    pub plan: Vec<String>,
}
