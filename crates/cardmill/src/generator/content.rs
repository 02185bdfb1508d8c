//! The generation loop: one full-deck pass, then bounded top-up rounds for
//! whatever came back short.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use tokio::time::timeout;

use crate::config::GenerationPolicy;
use crate::deck::normalize_question;
use crate::job::GenerationOptions;

use super::prompt;
use super::{
    BackendError, CardsDraft, DeckDraft, DraftCard, DraftMcq, GenerateError, GenerationRequest,
    GenerativeBackend, McqsDraft, PlanDraft,
};

/// Target counts resolved for one job, either from the caller's request or
/// from the volume estimate.
#[derive(Debug, Clone, Copy)]
pub struct ContentTargets {
    pub cards: u32,
    pub mcqs: u32,
    pub plan_days: u32,
}

/// Deduplicated, sanitized content ready for assembly. Counts may fall
/// short of the targets when the backend under-delivers past the top-up
/// budget; that is reported as-is, not as an error.
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub title: Option<String>,
    pub cards: Vec<DraftCard>,
    pub mcqs: Vec<DraftMcq>,
    pub plan: Vec<String>,
}

/// Drives the generative backend through the full-deck pass and the
/// top-up rounds. The first pass is fatal on any failure; top-ups are
/// best-effort and log instead of failing the job.
pub struct ContentGenerator {
    backend: Arc<dyn GenerativeBackend>,
    policy: GenerationPolicy,
}

impl ContentGenerator {
    pub fn new(backend: Arc<dyn GenerativeBackend>, policy: GenerationPolicy) -> Self {
        Self { backend, policy }
    }

    /// Generates deck content for one extracted document.
    pub async fn generate(
        &self,
        text: &str,
        options: &GenerationOptions,
        targets: &ContentTargets,
    ) -> Result<GeneratedContent, GenerateError> {
        let payload =
            prompt::clip_chars(&prompt::sanitize_for_prompt(text), self.policy.input_char_budget);

        // First pass: the whole deck in one request. Any failure here is
        // the job's failure.
        let instructions =
            prompt::deck_instructions(options, targets.cards, targets.mcqs, targets.plan_days);
        let response = self
            .call(&instructions, &payload, prompt::deck_schema())
            .await?;
        let draft: DeckDraft = parse_response(&response)
            .map_err(|e| GenerateError::UnparsableDeck(e.to_string()))?;

        if draft.cards.is_empty() && draft.mcqs.is_empty() {
            return Err(GenerateError::EmptyDeck);
        }

        let mut seen_cards = HashSet::new();
        let mut seen_mcqs = HashSet::new();
        let mut cards = dedup_cards(draft.cards, &mut seen_cards);
        let mut mcqs = dedup_mcqs(draft.mcqs, &mut seen_mcqs);
        let mut plan = draft.plan;

        debug!(
            "First pass yielded {} cards, {} mcqs, {} plan lines (targets {}/{}/{})",
            cards.len(),
            mcqs.len(),
            plan.len(),
            targets.cards,
            targets.mcqs,
            targets.plan_days
        );

        self.top_up_cards(&payload, options, targets, &mut cards, &mut seen_cards)
            .await;
        self.top_up_mcqs(&payload, options, targets, &mut mcqs, &mut seen_mcqs)
            .await;

        // One supplementary plan request when the first pass came up short.
        // No retry beyond it; the longer of the two results wins.
        if (plan.len() as u32) < targets.plan_days {
            let supplement = self.fetch_plan(&payload, options, targets.plan_days).await;
            if supplement.len() > plan.len() {
                plan = supplement;
            }
        }

        if (cards.len() as u32) < targets.cards {
            warn!(
                "Deck under-delivered on cards after top-ups: {} of {}",
                cards.len(),
                targets.cards
            );
        }
        if (mcqs.len() as u32) < targets.mcqs {
            warn!(
                "Deck under-delivered on mcqs after top-ups: {} of {}",
                mcqs.len(),
                targets.mcqs
            );
        }

        Ok(GeneratedContent {
            title: draft.title,
            cards,
            mcqs,
            plan,
        })
    }

    async fn top_up_cards(
        &self,
        payload: &str,
        options: &GenerationOptions,
        targets: &ContentTargets,
        cards: &mut Vec<DraftCard>,
        seen: &mut HashSet<String>,
    ) {
        let mut attempts = 0;
        while (cards.len() as u32) < targets.cards && attempts < self.policy.max_topup_attempts {
            attempts += 1;
            let need = targets.cards - cards.len() as u32;
            let exclusions =
                exclusion_list(cards.iter().map(|c| c.question.clone()), self.policy.exclusion_cap);
            let instructions = prompt::cards_topup_instructions(options, need, &exclusions);

            let response = match self.call(&instructions, payload, prompt::cards_schema()).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Card top-up attempt {} failed, keeping partial deck: {}", attempts, e);
                    break;
                }
            };
            let draft: CardsDraft = match parse_response(&response) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Card top-up attempt {} returned unparsable output: {}", attempts, e);
                    break;
                }
            };

            let before = cards.len();
            cards.extend(dedup_cards(draft.cards, seen));
            debug!(
                "Card top-up attempt {} added {} new cards",
                attempts,
                cards.len() - before
            );
            if cards.len() == before {
                // All duplicates; another round with the same exclusions
                // would not do better.
                break;
            }
        }
    }

    async fn top_up_mcqs(
        &self,
        payload: &str,
        options: &GenerationOptions,
        targets: &ContentTargets,
        mcqs: &mut Vec<DraftMcq>,
        seen: &mut HashSet<String>,
    ) {
        let mut attempts = 0;
        while (mcqs.len() as u32) < targets.mcqs && attempts < self.policy.max_topup_attempts {
            attempts += 1;
            let need = targets.mcqs - mcqs.len() as u32;
            let exclusions =
                exclusion_list(mcqs.iter().map(|m| m.question.clone()), self.policy.exclusion_cap);
            let instructions = prompt::mcqs_topup_instructions(options, need, &exclusions);

            let response = match self.call(&instructions, payload, prompt::mcqs_schema()).await {
                Ok(r) => r,
                Err(e) => {
                    warn!("Mcq top-up attempt {} failed, keeping partial deck: {}", attempts, e);
                    break;
                }
            };
            let draft: McqsDraft = match parse_response(&response) {
                Ok(d) => d,
                Err(e) => {
                    warn!("Mcq top-up attempt {} returned unparsable output: {}", attempts, e);
                    break;
                }
            };

            let before = mcqs.len();
            mcqs.extend(dedup_mcqs(draft.mcqs, seen));
            debug!(
                "Mcq top-up attempt {} added {} new mcqs",
                attempts,
                mcqs.len() - before
            );
            if mcqs.len() == before {
                break;
            }
        }
    }

    async fn fetch_plan(
        &self,
        payload: &str,
        options: &GenerationOptions,
        plan_days: u32,
    ) -> Vec<String> {
        let instructions = prompt::plan_instructions(options, plan_days);
        match self.call(&instructions, payload, prompt::plan_schema()).await {
            Ok(response) => match parse_response::<PlanDraft>(&response) {
                Ok(draft) => draft.plan,
                Err(e) => {
                    warn!("Plan supplement returned unparsable output, shipping without a plan: {}", e);
                    Vec::new()
                }
            },
            Err(e) => {
                warn!("Plan supplement failed, shipping without a plan: {}", e);
                Vec::new()
            }
        }
    }

    async fn call(
        &self,
        instructions: &str,
        payload: &str,
        schema: serde_json::Value,
    ) -> Result<String, GenerateError> {
        let request = GenerationRequest {
            instructions: instructions.to_string(),
            payload: payload.to_string(),
            schema,
            max_tokens: self.policy.max_output_tokens,
        };
        let response = timeout(self.policy.backend_timeout, self.backend.generate(&request))
            .await
            .map_err(|_| GenerateError::Timeout(self.policy.backend_timeout))??;
        if response.trim().is_empty() {
            return Err(GenerateError::Backend(BackendError::Empty));
        }
        Ok(response)
    }
}

fn parse_response<T: serde::de::DeserializeOwned>(response: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(&prompt::extract_json(response))
}

/// Keeps the first occurrence of each normalized question, dropping cards
/// with blank questions or answers.
fn dedup_cards(drafts: Vec<DraftCard>, seen: &mut HashSet<String>) -> Vec<DraftCard> {
    drafts
        .into_iter()
        .filter(|c| !c.question.trim().is_empty() && !c.answer.trim().is_empty())
        .filter(|c| seen.insert(normalize_question(&c.question)))
        .collect()
}

/// Keeps the first occurrence of each normalized question, dropping mcqs
/// with an out-of-range option count or correct index.
fn dedup_mcqs(drafts: Vec<DraftMcq>, seen: &mut HashSet<String>) -> Vec<DraftMcq> {
    drafts
        .into_iter()
        .filter(|m| !m.question.trim().is_empty())
        .filter(|m| (3..=6).contains(&m.options.len()) && m.correct_index < m.options.len())
        .filter(|m| seen.insert(normalize_question(&m.question)))
        .collect()
}

fn exclusion_list<I: Iterator<Item = String>>(questions: I, cap: usize) -> Vec<String> {
    questions.take(cap).collect()
}
