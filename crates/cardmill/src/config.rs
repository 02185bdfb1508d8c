//! Generation policy: the named, overridable constants behind estimation,
//! generation and assembly. These are policy, not algorithm: callers tune
//! them per deployment instead of patching inline literals.

use std::time::Duration;

use crate::job::Intensity;

#[derive(Debug, Clone)]
pub struct GenerationPolicy {
    /// Words assumed per source page when approximating page count.
    pub words_per_page: u32,
    /// Cards per estimated page at light intensity.
    pub cards_per_page_light: u32,
    /// Cards per estimated page at standard intensity.
    pub cards_per_page_standard: u32,
    /// Cards per estimated page at max intensity.
    pub cards_per_page_max: u32,
    /// Lower clamp for the recommended card count.
    pub min_cards: u32,
    /// Upper clamp for the recommended card count.
    pub max_cards: u32,
    /// Recommended mcqs are recommended cards divided by this.
    pub mcq_divisor: u32,
    /// Lower clamp for the recommended mcq count.
    pub min_mcqs: u32,
    /// Upper clamp for the recommended mcq count.
    pub max_mcqs: u32,
    /// Global hard cap on cards and mcqs in an assembled deck.
    pub hard_cap: u32,
    /// Maximum revision plan length in days.
    pub plan_cap: u32,
    /// Minimum extracted-text length; shorter documents fail the extract
    /// stage before the expensive generation stage runs.
    pub min_text_chars: usize,
    /// Source text is clipped to this many characters before being sent to
    /// the generative backend, bounding cost and latency.
    pub input_char_budget: usize,
    /// Maximum supplementary top-up rounds per content kind.
    pub max_topup_attempts: u32,
    /// Maximum number of already-used questions included in a top-up
    /// exclusion list, bounding prompt size.
    pub exclusion_cap: usize,
    /// Output budget passed to the backend on every request.
    pub max_output_tokens: u32,
    /// Per-call deadline for generation requests.
    pub backend_timeout: Duration,
    /// Deadline for text extraction.
    pub extract_timeout: Duration,
}

impl GenerationPolicy {
    /// Cards-per-page factor for the given intensity.
    pub fn cards_per_page(&self, intensity: Intensity) -> u32 {
        match intensity {
            Intensity::Light => self.cards_per_page_light,
            Intensity::Standard => self.cards_per_page_standard,
            Intensity::Max => self.cards_per_page_max,
        }
    }
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            words_per_page: 400,
            cards_per_page_light: 6,
            cards_per_page_standard: 10,
            cards_per_page_max: 14,
            min_cards: 8,
            max_cards: 200,
            mcq_divisor: 3,
            min_mcqs: 4,
            max_mcqs: 100,
            hard_cap: 200,
            plan_cap: 14,
            min_text_chars: 300,
            input_char_budget: 12_000,
            max_topup_attempts: 2,
            exclusion_cap: 200,
            max_output_tokens: 4096,
            backend_timeout: Duration::from_secs(120),
            extract_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cards_per_page_ordering() {
        let policy = GenerationPolicy::default();
        assert!(policy.cards_per_page(Intensity::Light) < policy.cards_per_page(Intensity::Standard));
        assert!(policy.cards_per_page(Intensity::Standard) < policy.cards_per_page(Intensity::Max));
    }

    #[test]
    fn test_default_caps_are_consistent() {
        let policy = GenerationPolicy::default();
        assert!(policy.min_cards <= policy.max_cards);
        assert!(policy.max_cards <= policy.hard_cap);
        assert!(policy.min_mcqs <= policy.max_mcqs);
        assert!(policy.min_text_chars < policy.input_char_budget);
    }
}
