//! Builders for source documents and scripted backend responses.

use serde_json::json;

/// A plain-text source document comfortably above the minimum extractable
/// length. Roughly `words` whitespace-separated tokens.
pub fn source_text(words: usize) -> String {
    (0..words)
        .map(|i| format!("term{}", i))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn card(question: &str) -> serde_json::Value {
    json!({"question": question, "answer": format!("answer to {question}")})
}

pub fn mcq(question: &str) -> serde_json::Value {
    json!({
        "question": question,
        "options": ["alpha", "beta", "gamma", "delta"],
        "correctIndex": 1,
        "explanation": "beta is correct"
    })
}

/// Full first-pass response with the given card and mcq questions.
pub fn deck_response(card_questions: &[&str], mcq_questions: &[&str]) -> String {
    json!({
        "title": "Generated deck",
        "cards": card_questions.iter().map(|q| card(q)).collect::<Vec<_>>(),
        "mcqs": mcq_questions.iter().map(|q| mcq(q)).collect::<Vec<_>>(),
        "plan": ["Day 1: skim the source", "Day 2: drill the cards"]
    })
    .to_string()
}

/// Cards-only top-up response.
pub fn cards_response(questions: &[&str]) -> String {
    json!({"cards": questions.iter().map(|q| card(q)).collect::<Vec<_>>()}).to_string()
}

/// Mcqs-only top-up response.
pub fn mcqs_response(questions: &[&str]) -> String {
    json!({"mcqs": questions.iter().map(|q| mcq(q)).collect::<Vec<_>>()}).to_string()
}
