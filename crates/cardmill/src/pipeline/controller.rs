//! Pipeline controller: owns the asynchronous run of a job from queued
//! to done, persisting every stage transition and broadcasting it.

use std::sync::Arc;

use log::{error, info};
use tokio::time::timeout;
use tracing::{info_span, Instrument};

use crate::assembler::DeckAssembler;
use crate::config::GenerationPolicy;
use crate::estimator;
use crate::extractor::{ExtractError, ExtractorRegistry};
use crate::generator::{ContentGenerator, ContentTargets};
use crate::job::{GenerationOptions, Job, JobStage, JobStatus, JobUpdate};
use crate::progress::{JobProgressBroadcaster, JobProgressEvent};
use crate::store::{DeckStore, JobStore};

use super::error::PipelineError;
use super::scheduler::Scheduler;
use super::{PROGRESS_DONE, PROGRESS_ESTIMATE, PROGRESS_EXTRACT, PROGRESS_GENERATE, PROGRESS_SAVE};

/// Drives jobs through extract → estimate → generate → save. Cloneable;
/// clones share the stores, the backend and the broadcaster.
#[derive(Clone)]
pub struct PipelineController {
    job_store: JobStore,
    deck_store: DeckStore,
    extractors: Arc<ExtractorRegistry>,
    generator: Arc<ContentGenerator>,
    assembler: Arc<DeckAssembler>,
    scheduler: Arc<dyn Scheduler>,
    broadcaster: JobProgressBroadcaster,
    policy: GenerationPolicy,
}

impl PipelineController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_store: JobStore,
        deck_store: DeckStore,
        extractors: Arc<ExtractorRegistry>,
        generator: Arc<ContentGenerator>,
        scheduler: Arc<dyn Scheduler>,
        broadcaster: JobProgressBroadcaster,
        policy: GenerationPolicy,
    ) -> Self {
        Self {
            job_store,
            deck_store,
            extractors,
            generator,
            assembler: Arc::new(DeckAssembler::new(policy.clone())),
            scheduler,
            broadcaster,
            policy,
        }
    }

    /// Persists a fresh queued job and schedules its run. Returns the job
    /// immediately; progress is observable via the store and broadcaster.
    pub fn submit(
        &self,
        bytes: Vec<u8>,
        mime_type: Option<String>,
        source_filename: &str,
        options: GenerationOptions,
    ) -> Result<Job, PipelineError> {
        let job = Job::new(source_filename, mime_type, options);
        self.job_store.create(&job)?;
        info!("Queued job {} for {}", job.id, job.source_filename);
        self.broadcaster
            .send(JobProgressEvent::from_job(&job, "Job queued"));

        let controller = self.clone();
        let spawned_job = job.clone();
        let span = info_span!("job", id = %job.id, filename = %job.source_filename);
        self.scheduler.spawn(Box::pin(
            async move {
                controller.run_job(spawned_job, bytes).await;
            }
            .instrument(span),
        ));

        Ok(job)
    }

    async fn run_job(&self, job: Job, bytes: Vec<u8>) {
        let job_id = job.id.clone();
        if let Err((stage, err)) = self.run_stages(job, bytes).await {
            error!("Job {} failed at {} stage: {}", job_id, stage, err);
            self.mark_failed(&job_id, stage, &err.to_string());
        }
    }

    async fn run_stages(&self, job: Job, bytes: Vec<u8>) -> Result<(), (JobStage, PipelineError)> {
        let job_id = job.id.clone();

        // Extract
        self.advance(
            &job_id,
            JobUpdate::stage(JobStatus::Extracting, JobStage::Extract, PROGRESS_EXTRACT),
            "Extracting text",
        )
        .map_err(|e| (JobStage::Extract, e.into()))?;
        let text = self
            .extract_text(bytes, job.mime_type.clone())
            .await
            .map_err(|e| (JobStage::Extract, e))?;

        // Estimate, only when the caller asked for volume-derived counts.
        let targets = if job.options.auto_counts {
            let estimate = estimator::estimate(&text, job.options.intensity, &self.policy);
            let targets = ContentTargets {
                cards: estimate.recommended_cards,
                mcqs: estimate.recommended_mcqs,
                plan_days: job.options.plan_days,
            };
            let mut update =
                JobUpdate::stage(JobStatus::Estimating, JobStage::Estimate, PROGRESS_ESTIMATE);
            update.est_words = Some(estimate.words);
            update.est_pages = Some(estimate.pages_approx);
            update.final_cards = Some(targets.cards);
            update.final_mcqs = Some(targets.mcqs);
            self.advance(&job_id, update, "Estimating content volume")
                .map_err(|e| (JobStage::Estimate, e.into()))?;
            info!(
                "Job {}: {} words (~{} pages), targeting {} cards / {} mcqs",
                job_id, estimate.words, estimate.pages_approx, targets.cards, targets.mcqs
            );
            targets
        } else {
            ContentTargets {
                cards: job.options.requested_cards,
                mcqs: job.options.requested_mcqs,
                plan_days: job.options.plan_days,
            }
        };

        // Generate
        let mut update =
            JobUpdate::stage(JobStatus::Generating, JobStage::Generate, PROGRESS_GENERATE);
        update.final_cards = Some(targets.cards);
        update.final_mcqs = Some(targets.mcqs);
        self.advance(&job_id, update, "Generating study content")
            .map_err(|e| (JobStage::Generate, e.into()))?;
        let content = self
            .generator
            .generate(&text, &job.options, &targets)
            .await
            .map_err(|e| (JobStage::Generate, e.into()))?;

        // Save
        self.advance(
            &job_id,
            JobUpdate::stage(JobStatus::Saving, JobStage::Save, PROGRESS_SAVE),
            "Saving deck",
        )
        .map_err(|e| (JobStage::Save, e.into()))?;
        let deck = self.assembler.assemble(&job, content, &targets);
        self.deck_store
            .save(&deck)
            .map_err(|e| (JobStage::Save, e.into()))?;

        let mut done = JobUpdate::stage(JobStatus::Done, JobStage::Done, PROGRESS_DONE);
        done.deck_id = Some(deck.id.clone());
        self.advance(&job_id, done, "Deck ready")
            .map_err(|e| (JobStage::Save, e.into()))?;
        info!(
            "Job {} done: deck {} with {} cards, {} mcqs",
            job_id,
            deck.id,
            deck.cards.len(),
            deck.mcqs.len()
        );
        Ok(())
    }

    /// Extraction runs on the blocking pool under a deadline; parsers are
    /// synchronous and may chew CPU on large documents.
    async fn extract_text(
        &self,
        bytes: Vec<u8>,
        mime_type: Option<String>,
    ) -> Result<String, PipelineError> {
        let mime = mime_type
            .ok_or_else(|| ExtractError::UnsupportedMime("unknown".to_string()))?;

        let extractors = Arc::clone(&self.extractors);
        let min_chars = self.policy.min_text_chars;
        let task = tokio::task::spawn_blocking(move || -> Result<String, ExtractError> {
            let text = extractors.extract(&bytes, &mime)?;
            let chars = text.chars().count();
            if chars < min_chars {
                return Err(ExtractError::InsufficientText {
                    chars,
                    min: min_chars,
                });
            }
            Ok(text)
        });

        let joined = timeout(self.policy.extract_timeout, task)
            .await
            .map_err(|_| PipelineError::ExtractTimeout(self.policy.extract_timeout))?;
        let text = joined
            .map_err(|e| ExtractError::Failed(format!("extraction task panicked: {e}")))??;
        Ok(text)
    }

    /// Persists a stage transition and broadcasts the updated snapshot.
    fn advance(
        &self,
        job_id: &str,
        update: JobUpdate,
        message: &str,
    ) -> Result<(), crate::db::DatabaseError> {
        let job = self.job_store.update(job_id, &update)?;
        self.broadcaster
            .send(JobProgressEvent::from_job(&job, message));
        Ok(())
    }

    /// Records the failure. Best-effort: if the store itself is down the
    /// failure is logged and the record stays stale until the restart sweep.
    fn mark_failed(&self, job_id: &str, stage: JobStage, message: &str) {
        match self.job_store.update(job_id, &JobUpdate::failed(stage, message)) {
            Ok(job) => {
                self.broadcaster
                    .send(JobProgressEvent::from_job(&job, "Job failed"));
            }
            Err(e) => error!("Could not record failure of job {}: {}", job_id, e),
        }
    }
}
