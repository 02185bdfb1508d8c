//! Job model: the tracked lifecycle of turning one uploaded document into one deck.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a generation job. Transitions move forward through the stage
/// order or jump to `Error` from any non-terminal state, never backward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Extracting,
    Estimating,
    Generating,
    Saving,
    Done,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Extracting => "extracting",
            JobStatus::Estimating => "estimating",
            JobStatus::Generating => "generating",
            JobStatus::Saving => "saving",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }

    /// Returns true if this job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }

    /// Position of this status in the forward stage order. `Error` ranks
    /// last so a jump to it never counts as a regression.
    pub fn rank(&self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::Extracting => 1,
            JobStatus::Estimating => 2,
            JobStatus::Generating => 3,
            JobStatus::Saving => 4,
            JobStatus::Done => 5,
            JobStatus::Error => 6,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named phase of the pipeline, recorded on the job as a stage label.
/// On failure this holds the stage that failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Queued,
    Extract,
    Estimate,
    Generate,
    Save,
    Done,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Queued => "queued",
            JobStage::Extract => "extract",
            JobStage::Estimate => "estimate",
            JobStage::Generate => "generate",
            JobStage::Save => "save",
            JobStage::Done => "done",
        }
    }
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse knob controlling target cards/mcqs per estimated page of source text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Light,
    #[default]
    Standard,
    Max,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Light => "light",
            Intensity::Standard => "standard",
            Intensity::Max => "max",
        }
    }
}

/// Caller-supplied options for one generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Student level (e.g. "undergraduate", "med-school-year-2").
    pub level: String,
    /// Subject label copied through to the deck.
    #[serde(default)]
    pub subject: Option<String>,
    /// Requested number of flashcards (ignored when `auto_counts` is set).
    pub requested_cards: u32,
    /// Requested number of multiple-choice questions.
    pub requested_mcqs: u32,
    /// Requested length of the revision plan in days.
    pub plan_days: u32,
    /// Prefer clinical phrasing and exam-style distractors.
    #[serde(default)]
    pub medical_style: bool,
    /// Output language for generated content.
    pub language: String,
    /// Derive target counts from the source volume instead of the
    /// requested counts.
    #[serde(default)]
    pub auto_counts: bool,
    #[serde(default)]
    pub intensity: Intensity,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            level: "general".to_string(),
            subject: None,
            requested_cards: 20,
            requested_mcqs: 8,
            plan_days: 7,
            medical_style: false,
            language: "en".to_string(),
            auto_counts: false,
            intensity: Intensity::Standard,
        }
    }
}

/// A generation job. Created once by submit, mutated only by the pipeline,
/// never deleted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    /// Original filename of the uploaded document.
    pub source_filename: String,
    /// MIME type of the uploaded document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub status: JobStatus,
    pub stage: JobStage,
    /// Progress in [0, 1], non-decreasing while status != error.
    pub progress: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub options: GenerationOptions,
    /// Whitespace word count of the extracted text (set once estimation runs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub est_words: Option<u32>,
    /// Approximate page count (set once estimation runs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub est_pages: Option<u32>,
    /// Final card target after estimation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_cards: Option<u32>,
    /// Final mcq target after estimation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_mcqs: Option<u32>,
    /// Set if and only if status is `Done`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deck_id: Option<String>,
    /// Human-readable failure message (set on error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// Creates a freshly queued job. MIME type falls back to a guess from
    /// the filename extension when the caller did not provide one.
    pub fn new(source_filename: &str, mime_type: Option<String>, options: GenerationOptions) -> Self {
        let mime_type = mime_type.or_else(|| detect_mime_type(source_filename));
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_filename: source_filename.to_string(),
            mime_type,
            status: JobStatus::Queued,
            stage: JobStage::Queued,
            progress: crate::pipeline::PROGRESS_QUEUED,
            created_at: now,
            updated_at: now,
            options,
            est_words: None,
            est_pages: None,
            final_cards: None,
            final_mcqs: None,
            deck_id: None,
            error: None,
        }
    }

    /// Returns true if this job has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Detects MIME type from a filename using the mime_guess crate.
/// Returns `None` for unknown extensions.
fn detect_mime_type(filename: &str) -> Option<String> {
    mime_guess::from_path(filename).first().map(|m| m.to_string())
}

/// Partial update applied to a job record. `None` fields are left untouched;
/// the store bumps `updated_at` on every apply.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub stage: Option<JobStage>,
    pub progress: Option<f32>,
    pub est_words: Option<u32>,
    pub est_pages: Option<u32>,
    pub final_cards: Option<u32>,
    pub final_mcqs: Option<u32>,
    pub deck_id: Option<String>,
    pub error: Option<String>,
}

impl JobUpdate {
    /// Update for a normal stage transition.
    pub fn stage(status: JobStatus, stage: JobStage, progress: f32) -> Self {
        Self {
            status: Some(status),
            stage: Some(stage),
            progress: Some(progress),
            ..Default::default()
        }
    }

    /// Update marking the job as failed at the given stage.
    pub fn failed(stage: JobStage, message: &str) -> Self {
        Self {
            status: Some(JobStatus::Error),
            stage: Some(stage),
            error: Some(message.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_new() {
        let job = Job::new("notes.md", None, GenerationOptions::default());
        assert!(!job.id.is_empty());
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.stage, JobStage::Queued);
        assert!(job.progress > 0.0 && job.progress < 0.1);
        assert!(job.deck_id.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_mime_type_detection() {
        let job = Job::new("lecture.txt", None, GenerationOptions::default());
        assert_eq!(job.mime_type, Some("text/plain".to_string()));

        let job = Job::new("lecture.pdf", None, GenerationOptions::default());
        assert_eq!(job.mime_type, Some("application/pdf".to_string()));

        // Explicit MIME type overrides detection
        let job = Job::new(
            "lecture.bin",
            Some("text/plain".to_string()),
            GenerationOptions::default(),
        );
        assert_eq!(job.mime_type, Some("text/plain".to_string()));

        let job = Job::new("noextension", None, GenerationOptions::default());
        assert!(job.mime_type.is_none());
    }

    #[test]
    fn test_status_terminal() {
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Error.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Generating.is_terminal());
    }

    #[test]
    fn test_status_rank_is_forward_ordered() {
        let order = [
            JobStatus::Queued,
            JobStatus::Extracting,
            JobStatus::Estimating,
            JobStatus::Generating,
            JobStatus::Saving,
            JobStatus::Done,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
        // Error ranks after everything so the terminal jump never regresses.
        assert!(JobStatus::Error.rank() > JobStatus::Done.rank());
    }

    #[test]
    fn test_job_update_failed() {
        let update = JobUpdate::failed(JobStage::Generate, "backend unreachable");
        assert_eq!(update.status, Some(JobStatus::Error));
        assert_eq!(update.stage, Some(JobStage::Generate));
        assert_eq!(update.error.as_deref(), Some("backend unreachable"));
        assert!(update.progress.is_none());
    }

    #[test]
    fn test_options_serde_round_trip() {
        let options = GenerationOptions {
            subject: Some("Cardiology".to_string()),
            medical_style: true,
            intensity: Intensity::Max,
            ..Default::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"requestedCards\""));
        assert!(json.contains("\"medicalStyle\":true"));
        let back: GenerationOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back.subject.as_deref(), Some("Cardiology"));
        assert_eq!(back.intensity, Intensity::Max);
    }
}
