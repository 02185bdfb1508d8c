//! Typed stores over the database: `JobStore` for job records and
//! `DeckStore` for assembled decks.
//!
//! A job has exactly one writer (the pipeline) after creation, so updates
//! are plain read-merge-write without row locking. Both stores are `Clone`
//! (the inner database handle is `Arc`-based) and safe to share across
//! concurrently running jobs.

use chrono::{DateTime, Utc};

use crate::db::deck_repo::{self, DeckRow};
use crate::db::job_repo::{self, JobFilter, JobRow};
use crate::db::{Database, DatabaseError};
use crate::deck::{Card, Deck, Mcq};
use crate::job::{GenerationOptions, Job, JobStage, JobStatus, JobUpdate};

// ─── Helpers ────────────────────────────────────────────────────────────────

fn parse_status(s: &str, job_id: &str) -> JobStatus {
    match s {
        "queued" => JobStatus::Queued,
        "extracting" => JobStatus::Extracting,
        "estimating" => JobStatus::Estimating,
        "generating" => JobStatus::Generating,
        "saving" => JobStatus::Saving,
        "done" => JobStatus::Done,
        "error" => JobStatus::Error,
        other => {
            log::warn!(
                "Unknown job status '{}' for job {}, defaulting to Error",
                other,
                job_id
            );
            JobStatus::Error
        }
    }
}

fn parse_stage(s: &str, job_id: &str) -> JobStage {
    match s {
        "queued" => JobStage::Queued,
        "extract" => JobStage::Extract,
        "estimate" => JobStage::Estimate,
        "generate" => JobStage::Generate,
        "save" => JobStage::Save,
        "done" => JobStage::Done,
        other => {
            log::warn!(
                "Unknown job stage '{}' for job {}, defaulting to Queued",
                other,
                job_id
            );
            JobStage::Queued
        }
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::warn!("parse_timestamp: failed to parse '{}': {}", s, e);
            Utc::now()
        })
}

fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ─── JobStore ───────────────────────────────────────────────────────────────

/// Persistent job store backed by rusqlite.
#[derive(Clone)]
pub struct JobStore {
    db: Database,
}

impl JobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persists a freshly created job.
    pub fn create(&self, job: &Job) -> Result<(), DatabaseError> {
        let row = Self::to_row(job)?;
        job_repo::insert(&self.db, &row)
    }

    /// Fetches a job by id.
    pub fn get(&self, job_id: &str) -> Result<Option<Job>, DatabaseError> {
        match job_repo::find_by_id(&self.db, job_id)? {
            Some(row) => Ok(Some(Self::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Merges a partial update into the stored job and bumps `updated_at`.
    /// Returns the updated job.
    pub fn update(&self, job_id: &str, update: &JobUpdate) -> Result<Job, DatabaseError> {
        let row = job_repo::find_by_id(&self.db, job_id)?.ok_or_else(|| {
            DatabaseError::CorruptRecord {
                id: job_id.to_string(),
                reason: "update of nonexistent job".to_string(),
            }
        })?;

        let mut job = Self::from_row(&row)?;
        if let Some(status) = update.status {
            job.status = status;
        }
        if let Some(stage) = update.stage {
            job.stage = stage;
        }
        if let Some(progress) = update.progress {
            job.progress = progress;
        }
        if let Some(est_words) = update.est_words {
            job.est_words = Some(est_words);
        }
        if let Some(est_pages) = update.est_pages {
            job.est_pages = Some(est_pages);
        }
        if let Some(final_cards) = update.final_cards {
            job.final_cards = Some(final_cards);
        }
        if let Some(final_mcqs) = update.final_mcqs {
            job.final_mcqs = Some(final_mcqs);
        }
        if let Some(ref deck_id) = update.deck_id {
            job.deck_id = Some(deck_id.clone());
        }
        if let Some(ref error) = update.error {
            job.error = Some(error.clone());
        }
        job.updated_at = Utc::now();

        job_repo::update(&self.db, &Self::to_row(&job)?)?;
        Ok(job)
    }

    /// Lists jobs, newest first.
    pub fn list(&self, filter: &JobFilter) -> Result<(Vec<Job>, u64), DatabaseError> {
        let (rows, total) = job_repo::query(&self.db, filter)?;
        let jobs = rows
            .iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((jobs, total))
    }

    /// Counts jobs in the given status.
    pub fn count_by_status(&self, status: JobStatus) -> Result<u64, DatabaseError> {
        job_repo::count_by_status(&self.db, status.as_str())
    }

    /// Startup sweep: marks every job left in a non-terminal state as
    /// failed. A finished pipeline is never resumed, so anything still
    /// in-flight when the process died can only be dead.
    pub fn fail_interrupted(&self) -> Result<usize, DatabaseError> {
        let swept = job_repo::fail_non_terminal(
            &self.db,
            "interrupted by restart, submit a new job to retry",
            &format_timestamp(Utc::now()),
        )?;
        if swept > 0 {
            log::info!("Marked {} interrupted jobs as failed", swept);
        }
        Ok(swept)
    }

    fn to_row(job: &Job) -> Result<JobRow, DatabaseError> {
        let options =
            serde_json::to_string(&job.options).map_err(|e| DatabaseError::CorruptRecord {
                id: job.id.clone(),
                reason: format!("options serialize: {}", e),
            })?;
        Ok(JobRow {
            id: job.id.clone(),
            source_filename: job.source_filename.clone(),
            mime_type: job.mime_type.clone(),
            status: job.status.as_str().to_string(),
            stage: job.stage.as_str().to_string(),
            progress: job.progress as f64,
            options,
            est_words: job.est_words,
            est_pages: job.est_pages,
            final_cards: job.final_cards,
            final_mcqs: job.final_mcqs,
            deck_id: job.deck_id.clone(),
            error: job.error.clone(),
            created_at: format_timestamp(job.created_at),
            updated_at: format_timestamp(job.updated_at),
        })
    }

    fn from_row(row: &JobRow) -> Result<Job, DatabaseError> {
        let options: GenerationOptions =
            serde_json::from_str(&row.options).map_err(|e| DatabaseError::CorruptRecord {
                id: row.id.clone(),
                reason: format!("options parse: {}", e),
            })?;
        Ok(Job {
            id: row.id.clone(),
            source_filename: row.source_filename.clone(),
            mime_type: row.mime_type.clone(),
            status: parse_status(&row.status, &row.id),
            stage: parse_stage(&row.stage, &row.id),
            progress: row.progress as f32,
            created_at: parse_timestamp(&row.created_at),
            updated_at: parse_timestamp(&row.updated_at),
            options,
            est_words: row.est_words,
            est_pages: row.est_pages,
            final_cards: row.final_cards,
            final_mcqs: row.final_mcqs,
            deck_id: row.deck_id.clone(),
            error: row.error.clone(),
        })
    }
}

// ─── DeckStore ──────────────────────────────────────────────────────────────

/// Persistent deck store backed by rusqlite. Decks are written whole at the
/// saving stage; there is no partial write path.
#[derive(Clone)]
pub struct DeckStore {
    db: Database,
}

impl DeckStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Upserts a deck by id.
    pub fn save(&self, deck: &Deck) -> Result<(), DatabaseError> {
        let row = Self::to_row(deck)?;
        deck_repo::upsert(&self.db, &row)
    }

    /// Fetches a deck by id.
    pub fn get(&self, deck_id: &str) -> Result<Option<Deck>, DatabaseError> {
        match deck_repo::find_by_id(&self.db, deck_id)? {
            Some(row) => Ok(Some(Self::from_row(&row)?)),
            None => Ok(None),
        }
    }

    fn to_row(deck: &Deck) -> Result<DeckRow, DatabaseError> {
        let corrupt = |e: serde_json::Error| DatabaseError::CorruptRecord {
            id: deck.id.clone(),
            reason: e.to_string(),
        };
        Ok(DeckRow {
            id: deck.id.clone(),
            title: deck.title.clone(),
            level: deck.level.clone(),
            subject: deck.subject.clone(),
            source_filename: deck.source_filename.clone(),
            cards: serde_json::to_string(&deck.cards).map_err(corrupt)?,
            mcqs: serde_json::to_string(&deck.mcqs).map_err(corrupt)?,
            plan: serde_json::to_string(&deck.plan).map_err(corrupt)?,
            created_at: format_timestamp(deck.created_at),
        })
    }

    fn from_row(row: &DeckRow) -> Result<Deck, DatabaseError> {
        let corrupt = |e: serde_json::Error| DatabaseError::CorruptRecord {
            id: row.id.clone(),
            reason: e.to_string(),
        };
        let cards: Vec<Card> = serde_json::from_str(&row.cards).map_err(corrupt)?;
        let mcqs: Vec<Mcq> = serde_json::from_str(&row.mcqs).map_err(corrupt)?;
        let plan: Vec<String> = serde_json::from_str(&row.plan).map_err(corrupt)?;
        Ok(Deck {
            id: row.id.clone(),
            title: row.title.clone(),
            level: row.level.clone(),
            subject: row.subject.clone(),
            created_at: parse_timestamp(&row.created_at),
            source_filename: row.source_filename.clone(),
            cards,
            mcqs,
            plan,
        })
    }
}
