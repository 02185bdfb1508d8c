//! Volume estimation: a pure heuristic from text size to target counts.
//!
//! No I/O, no randomness: identical inputs always yield identical outputs.
//! All constants live in `GenerationPolicy`.

use crate::config::GenerationPolicy;
use crate::job::Intensity;

/// Output of the volume heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeEstimate {
    /// Whitespace token count of the text.
    pub words: u32,
    /// `max(1, round(words / words_per_page))`.
    pub pages_approx: u32,
    /// `clamp(pages * cards_per_page[intensity], min_cards, max_cards)`.
    pub recommended_cards: u32,
    /// `clamp(recommended_cards / mcq_divisor, min_mcqs, max_mcqs)`.
    pub recommended_mcqs: u32,
}

/// Estimates how much study content a text supports.
pub fn estimate(text: &str, intensity: Intensity, policy: &GenerationPolicy) -> VolumeEstimate {
    let words = text.split_whitespace().count() as u32;

    let pages_approx = ((words as f64 / policy.words_per_page as f64).round() as u32).max(1);

    let raw_cards = pages_approx * policy.cards_per_page(intensity);
    let recommended_cards = raw_cards.clamp(policy.min_cards, policy.max_cards);

    let raw_mcqs = recommended_cards / policy.mcq_divisor;
    let recommended_mcqs = raw_mcqs.clamp(policy.min_mcqs, policy.max_mcqs);

    VolumeEstimate {
        words,
        pages_approx,
        recommended_cards,
        recommended_mcqs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_word_count_uses_whitespace_tokens() {
        let policy = GenerationPolicy::default();
        let est = estimate("one  two\tthree\nfour", Intensity::Standard, &policy);
        assert_eq!(est.words, 4);
    }

    #[test]
    fn test_empty_text_still_one_page() {
        let policy = GenerationPolicy::default();
        let est = estimate("", Intensity::Standard, &policy);
        assert_eq!(est.words, 0);
        assert_eq!(est.pages_approx, 1);
        // One page at standard density lands above the lower clamp.
        assert_eq!(est.recommended_cards, policy.cards_per_page_standard);
        assert_eq!(est.recommended_mcqs, policy.min_mcqs);
    }

    #[test]
    fn test_small_input_clamped_to_min() {
        let policy = GenerationPolicy::default();
        // One page at light density (6) falls below min_cards (8).
        let est = estimate("", Intensity::Light, &policy);
        assert_eq!(est.recommended_cards, policy.min_cards);
        assert_eq!(est.recommended_mcqs, policy.min_mcqs);
    }

    // Regression test for the documented constants: 3,200 words at
    // standard intensity → 8 pages, 80 cards, 26 mcqs.
    #[test]
    fn test_standard_intensity_3200_words() {
        let policy = GenerationPolicy::default();
        let est = estimate(&words(3200), Intensity::Standard, &policy);
        assert_eq!(est.words, 3200);
        assert_eq!(est.pages_approx, 8);
        assert_eq!(est.recommended_cards, 80);
        assert_eq!(est.recommended_mcqs, 26);
    }

    #[test]
    fn test_intensity_scales_targets() {
        let policy = GenerationPolicy::default();
        let text = words(3200);
        let light = estimate(&text, Intensity::Light, &policy);
        let standard = estimate(&text, Intensity::Standard, &policy);
        let max = estimate(&text, Intensity::Max, &policy);
        assert!(light.recommended_cards < standard.recommended_cards);
        assert!(standard.recommended_cards < max.recommended_cards);
        // Page estimate is intensity-independent.
        assert_eq!(light.pages_approx, max.pages_approx);
    }

    #[test]
    fn test_large_input_clamped_to_max() {
        let policy = GenerationPolicy::default();
        let est = estimate(&words(100_000), Intensity::Max, &policy);
        assert_eq!(est.recommended_cards, policy.max_cards);
        let expected_mcqs = policy.max_mcqs.min(policy.max_cards / policy.mcq_divisor);
        assert_eq!(est.recommended_mcqs, expected_mcqs);
    }

    #[test]
    fn test_rounding_of_page_count() {
        let policy = GenerationPolicy::default();
        // 600 words / 400 per page = 1.5 → rounds to 2.
        assert_eq!(estimate(&words(600), Intensity::Standard, &policy).pages_approx, 2);
        // 550 / 400 = 1.375 → rounds to 1.
        assert_eq!(estimate(&words(550), Intensity::Standard, &policy).pages_approx, 1);
    }

    #[test]
    fn test_deterministic() {
        let policy = GenerationPolicy::default();
        let text = words(1234);
        let a = estimate(&text, Intensity::Standard, &policy);
        let b = estimate(&text, Intensity::Standard, &policy);
        assert_eq!(a, b);
    }
}
