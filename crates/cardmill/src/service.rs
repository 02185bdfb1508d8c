//! Service facade: the embedding application's entry point.

use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::config::GenerationPolicy;
use crate::db::job_repo::JobFilter;
use crate::db::{Database, DatabaseError};
use crate::deck::Deck;
use crate::extractor::ExtractorRegistry;
use crate::generator::{ContentGenerator, GenerativeBackend};
use crate::job::{GenerationOptions, Job, JobStatus};
use crate::pipeline::{PipelineController, PipelineError, Scheduler};
use crate::progress::{JobProgressBroadcaster, JobProgressEvent};
use crate::store::{DeckStore, JobStore};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Acknowledgement returned by submit, before any processing has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub job_id: String,
    pub status: JobStatus,
}

/// Document-to-deck generation service. Cheap to clone; clones share the
/// database, the backend and the progress channel.
#[derive(Clone)]
pub struct DeckService {
    job_store: JobStore,
    deck_store: DeckStore,
    pipeline: PipelineController,
    broadcaster: JobProgressBroadcaster,
}

impl DeckService {
    pub fn new(
        db: Database,
        backend: Arc<dyn GenerativeBackend>,
        extractors: ExtractorRegistry,
        scheduler: Arc<dyn Scheduler>,
        policy: GenerationPolicy,
    ) -> Self {
        let job_store = JobStore::new(db.clone());
        let deck_store = DeckStore::new(db);
        let broadcaster = JobProgressBroadcaster::default();
        let generator = Arc::new(ContentGenerator::new(backend, policy.clone()));
        let pipeline = PipelineController::new(
            job_store.clone(),
            deck_store.clone(),
            Arc::new(extractors),
            generator,
            scheduler,
            broadcaster.clone(),
            policy,
        );
        Self {
            job_store,
            deck_store,
            pipeline,
            broadcaster,
        }
    }

    /// Accepts a document and queues a generation job. Returns immediately
    /// with the job id; track progress via `get_job` or `subscribe_progress`.
    pub fn submit_job(
        &self,
        bytes: Vec<u8>,
        mime_type: Option<String>,
        source_filename: &str,
        options: GenerationOptions,
    ) -> Result<SubmitReceipt, ServiceError> {
        let job = self
            .pipeline
            .submit(bytes, mime_type, source_filename, options)?;
        Ok(SubmitReceipt {
            job_id: job.id,
            status: job.status,
        })
    }

    pub fn get_job(&self, job_id: &str) -> Result<Job, ServiceError> {
        self.job_store
            .get(job_id)?
            .ok_or_else(|| ServiceError::JobNotFound(job_id.to_string()))
    }

    pub fn get_deck(&self, deck_id: &str) -> Result<Deck, ServiceError> {
        self.deck_store
            .get(deck_id)?
            .ok_or_else(|| ServiceError::DeckNotFound(deck_id.to_string()))
    }

    /// Lists jobs newest-first. Returns the page plus the total count.
    pub fn list_jobs(&self, filter: &JobFilter) -> Result<(Vec<Job>, u64), ServiceError> {
        Ok(self.job_store.list(filter)?)
    }

    pub fn count_jobs(&self, status: JobStatus) -> Result<u64, ServiceError> {
        Ok(self.job_store.count_by_status(status)?)
    }

    /// Subscribes to the progress event stream for all jobs.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.broadcaster.subscribe()
    }

    /// Startup sweep: jobs left non-terminal by a crash or restart are
    /// marked failed so no record sits in a live state forever.
    pub fn recover_interrupted(&self) -> Result<usize, ServiceError> {
        let swept = self.job_store.fail_interrupted()?;
        if swept > 0 {
            warn!("Marked {} interrupted job(s) as failed on startup", swept);
        }
        Ok(swept)
    }
}
