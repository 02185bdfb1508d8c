//! Prompt construction and structured-output scanning.

use crate::job::GenerationOptions;

/// Sanitizes text for safe inclusion in prompts.
///
/// Escapes ChatML tokens (`<|...|>`) and common instruction tokens so
/// uploaded document text cannot smuggle instructions into the request.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|", "< |")
        .replace("|>", "| >")
        .replace("<s>", "< s >")
        .replace("</s>", "< / s >")
        .replace("[INST]", "[ INST ]")
        .replace("[/INST]", "[ / INST ]")
        .replace("<<SYS>>", "< < SYS > >")
        .replace("<</SYS>>", "< < / SYS > >")
}

/// Clips text to a character budget on a char boundary.
pub fn clip_chars(text: &str, budget: usize) -> String {
    text.chars().take(budget).collect()
}

fn style_lines(options: &GenerationOptions) -> String {
    let mut lines = vec![
        format!("- Write in language: {}", options.language),
        format!("- Target audience level: {}", options.level),
        "- Use ONLY facts present in the source text; never invent content the source does not support".to_string(),
    ];
    if options.medical_style {
        lines.push(
            "- Use clinical phrasing and exam-style distractors appropriate for medical study"
                .to_string(),
        );
    }
    if let Some(ref subject) = options.subject {
        lines.push(format!("- Subject area: {}", sanitize_for_prompt(subject)));
    }
    lines.join("\n")
}

/// Instructions for the first full-deck pass.
pub fn deck_instructions(
    options: &GenerationOptions,
    cards: u32,
    mcqs: u32,
    plan_days: u32,
) -> String {
    format!(
        r#"You are a study-content generator. From the provided source text, produce a study deck.
Respond ONLY with valid JSON. Do not include any other text.

{style}

Return JSON:
{{"title": "short deck title",
  "cards": [{{"question": "...", "answer": "..."}}],
  "mcqs": [{{"question": "...", "options": ["..", "..", ".."], "correctIndex": 0, "explanation": "..."}}],
  "plan": ["Day 1: ...", "Day 2: ..."]}}

Counts:
- exactly {cards} cards
- exactly {mcqs} mcqs (each with 3 to 6 options, correctIndex within range)
- a revision plan of {plan_days} lines, one per day
All card and mcq questions must be distinct from each other."#,
        style = style_lines(options),
        cards = cards,
        mcqs = mcqs,
        plan_days = plan_days,
    )
}

/// Instructions for a cards-only top-up. The exclusion list keeps the
/// backend away from questions the deck already has.
pub fn cards_topup_instructions(
    options: &GenerationOptions,
    need: u32,
    exclusions: &[String],
) -> String {
    format!(
        r#"You are a study-content generator. From the provided source text, produce additional flashcards.
Respond ONLY with valid JSON: {{"cards": [{{"question": "...", "answer": "..."}}]}}

{style}

Produce exactly {need} NEW cards. Do NOT reuse or rephrase any of these already-used questions:
{exclusions}"#,
        style = style_lines(options),
        need = need,
        exclusions = format_exclusions(exclusions),
    )
}

/// Instructions for an mcqs-only top-up.
pub fn mcqs_topup_instructions(
    options: &GenerationOptions,
    need: u32,
    exclusions: &[String],
) -> String {
    format!(
        r#"You are a study-content generator. From the provided source text, produce additional multiple-choice questions.
Respond ONLY with valid JSON: {{"mcqs": [{{"question": "...", "options": ["..", "..", ".."], "correctIndex": 0, "explanation": "..."}}]}}

{style}

Produce exactly {need} NEW mcqs, each with 3 to 6 options and correctIndex within range.
Do NOT reuse or rephrase any of these already-used questions:
{exclusions}"#,
        style = style_lines(options),
        need = need,
        exclusions = format_exclusions(exclusions),
    )
}

/// Instructions for the single supplementary plan-only request.
pub fn plan_instructions(options: &GenerationOptions, plan_days: u32) -> String {
    format!(
        r#"You are a study-content generator. From the provided source text, produce a revision plan.
Respond ONLY with valid JSON: {{"plan": ["Day 1: ...", "Day 2: ..."]}}

{style}

The plan must have exactly {plan_days} lines, one per day."#,
        style = style_lines(options),
        plan_days = plan_days,
    )
}

fn card_item_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "question": {"type": "string"},
            "answer": {"type": "string"}
        },
        "required": ["question", "answer"]
    })
}

fn mcq_item_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "question": {"type": "string"},
            "options": {"type": "array", "items": {"type": "string"}, "minItems": 3, "maxItems": 6},
            "correctIndex": {"type": "integer"},
            "explanation": {"type": "string"}
        },
        "required": ["question", "options", "correctIndex"]
    })
}

fn plan_schema_value() -> serde_json::Value {
    serde_json::json!({"type": "array", "items": {"type": "string"}})
}

/// Schema for the first full-deck pass.
pub fn deck_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "cards": {"type": "array", "items": card_item_schema()},
            "mcqs": {"type": "array", "items": mcq_item_schema()},
            "plan": plan_schema_value()
        },
        "required": ["cards", "mcqs"]
    })
}

/// Schema for a cards-only top-up.
pub fn cards_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {"cards": {"type": "array", "items": card_item_schema()}},
        "required": ["cards"]
    })
}

/// Schema for an mcqs-only top-up.
pub fn mcqs_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {"mcqs": {"type": "array", "items": mcq_item_schema()}},
        "required": ["mcqs"]
    })
}

/// Schema for the plan-only supplement.
pub fn plan_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {"plan": plan_schema_value()},
        "required": ["plan"]
    })
}

fn format_exclusions(exclusions: &[String]) -> String {
    if exclusions.is_empty() {
        return "(none)".to_string();
    }
    exclusions
        .iter()
        .map(|q| format!("- {}", sanitize_for_prompt(q)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts the first balanced JSON object from a model response, handling
/// surrounding prose. Uses a stateful scanner that tracks string boundaries
/// and escape sequences.
pub fn extract_json(response: &str) -> String {
    // Find the start of JSON (first '{')
    let start = match response.find('{') {
        Some(idx) => idx,
        None => return response.to_string(), // No JSON found, return as-is
    };

    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;
    let mut end = response.len();

    for (i, c) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '{' if !in_string => {
                depth += 1;
            }
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    end = start + i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    response[start..end].to_string()
}
