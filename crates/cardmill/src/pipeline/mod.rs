//! The staged job pipeline: extract → estimate → generate → save.

pub mod controller;
pub mod error;
pub mod scheduler;

pub use controller::PipelineController;
pub use error::PipelineError;
pub use scheduler::{InlineScheduler, Scheduler, TokioScheduler};

// Progress checkpoints reported as each stage begins. Progress only ever
// moves forward through these while a job is live.
pub const PROGRESS_QUEUED: f32 = 0.02;
pub const PROGRESS_EXTRACT: f32 = 0.10;
pub const PROGRESS_ESTIMATE: f32 = 0.25;
pub const PROGRESS_GENERATE: f32 = 0.35;
pub const PROGRESS_SAVE: f32 = 0.90;
pub const PROGRESS_DONE: f32 = 1.0;
