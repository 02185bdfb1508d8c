//! Deck model: the structured study artifact produced by a successful job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single flashcard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub question: String,
    pub answer: String,
}

/// A multiple-choice question with 3 to 6 options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Mcq {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
}

/// The generated study deck: flashcards, multiple-choice questions and a
/// revision plan. Created exactly once, at the saving stage, by the
/// successful path only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub title: String,
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
    pub source_filename: String,
    pub cards: Vec<Card>,
    pub mcqs: Vec<Mcq>,
    pub plan: Vec<String>,
}

/// Normalizes a question into its deduplication key (trim + lowercase).
/// Two cards or mcqs sharing a normalized question are duplicates.
pub fn normalize_question(question: &str) -> String {
    question.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_question() {
        assert_eq!(normalize_question("  What is TCP? "), "what is tcp?");
        assert_eq!(
            normalize_question("WHAT IS TCP?"),
            normalize_question("what is tcp?")
        );
        assert_ne!(
            normalize_question("What is TCP?"),
            normalize_question("What is UDP?")
        );
    }

    #[test]
    fn test_deck_serde_round_trip() {
        let deck = Deck {
            id: "d-1".to_string(),
            title: "Networking basics".to_string(),
            level: "intro".to_string(),
            subject: Some("cs".to_string()),
            created_at: Utc::now(),
            source_filename: "notes.txt".to_string(),
            cards: vec![Card {
                id: "c-1".to_string(),
                question: "What is TCP?".to_string(),
                answer: "A reliable transport protocol".to_string(),
            }],
            mcqs: vec![Mcq {
                id: "m-1".to_string(),
                question: "Which layer does TCP live on?".to_string(),
                options: vec!["Link".into(), "Transport".into(), "Application".into()],
                correct_index: 1,
                explanation: "TCP is a transport-layer protocol".to_string(),
            }],
            plan: vec!["Day 1: read chapter 1".to_string()],
        };

        let json = serde_json::to_string(&deck).unwrap();
        assert!(json.contains("\"sourceFilename\""));
        assert!(json.contains("\"correctIndex\":1"));
        let back: Deck = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cards, deck.cards);
        assert_eq!(back.mcqs, deck.mcqs);
    }
}
