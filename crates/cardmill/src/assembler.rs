//! Deck assembly: turns generated content into a persisted-shape `Deck`.

use chrono::Utc;
use uuid::Uuid;

use crate::config::GenerationPolicy;
use crate::deck::{Card, Deck, Mcq};
use crate::generator::{ContentTargets, GeneratedContent};
use crate::job::Job;

/// Assembles the final deck: enforces the hard caps, stamps fresh ids and
/// copies job metadata through.
pub struct DeckAssembler {
    policy: GenerationPolicy,
}

impl DeckAssembler {
    pub fn new(policy: GenerationPolicy) -> Self {
        Self { policy }
    }

    pub fn assemble(&self, job: &Job, content: GeneratedContent, targets: &ContentTargets) -> Deck {
        let card_cap = targets.cards.min(self.policy.hard_cap) as usize;
        let mcq_cap = targets.mcqs.min(self.policy.hard_cap) as usize;
        let plan_cap = targets.plan_days.min(self.policy.plan_cap) as usize;

        let cards = content
            .cards
            .into_iter()
            .take(card_cap)
            .map(|c| Card {
                id: Uuid::new_v4().to_string(),
                question: c.question,
                answer: c.answer,
            })
            .collect();

        let mcqs = content
            .mcqs
            .into_iter()
            .take(mcq_cap)
            .map(|m| Mcq {
                id: Uuid::new_v4().to_string(),
                question: m.question,
                options: m.options,
                correct_index: m.correct_index,
                explanation: m.explanation,
            })
            .collect();

        let plan = content.plan.into_iter().take(plan_cap).collect();

        let title = content
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| default_title(&job.source_filename));

        Deck {
            id: Uuid::new_v4().to_string(),
            title,
            level: job.options.level.clone(),
            subject: job.options.subject.clone(),
            created_at: Utc::now(),
            source_filename: job.source_filename.clone(),
            cards,
            mcqs,
            plan,
        }
    }
}

/// Fallback title derived from the source filename, extension stripped.
fn default_title(filename: &str) -> String {
    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    if stem.is_empty() {
        "Study deck".to_string()
    } else {
        format!("Study deck: {}", stem)
    }
}
