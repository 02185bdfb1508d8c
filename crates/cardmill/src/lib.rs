//! cardmill: asynchronous document-to-study-deck generation.
//!
//! A caller submits a document and options, gets a job id back at once,
//! and the pipeline runs extract → estimate → generate → save in the
//! background, persisting every stage transition. Success produces a
//! `Deck` of flashcards, multiple-choice questions and a revision plan;
//! failure leaves a job record naming the stage that failed.

pub mod assembler;
pub mod config;
pub mod db;
pub mod deck;
pub mod error;
pub mod estimator;
pub mod extractor;
pub mod generator;
pub mod job;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod service;
pub mod store;

pub use config::GenerationPolicy;
pub use deck::{Card, Deck, Mcq};
pub use error::{CardmillError, Result};
pub use generator::{BackendError, GenerationRequest, GenerativeBackend};
pub use job::{GenerationOptions, Intensity, Job, JobStage, JobStatus};
pub use pipeline::{InlineScheduler, Scheduler, TokioScheduler};
pub use progress::{JobProgressBroadcaster, JobProgressEvent};
pub use service::{DeckService, ServiceError, SubmitReceipt};
pub use store::{DeckStore, JobStore};
