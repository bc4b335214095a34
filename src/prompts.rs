//! Prompt contract for quiz generation.
//!
//! The system prompt is the single source of truth for the JSON shape the
//! rest of the pipeline parses: `question`, `options` (exactly four),
//! `answer` as a zero-based index, optional `explanation`, wrapped in one
//! top-level array. [`crate::pipeline::parse`] and
//! [`crate::pipeline::normalize`] are written against this contract and
//! tolerate the ways models have been seen to break it.
//!
//! Building a prompt is pure: the same inputs always produce byte-identical
//! messages.

/// A rendered system/user message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

const SYSTEM_TEMPLATE: &str = r#"You are an educational quiz generator. You will receive the text of a PDF document. From that text, write up to {max_questions} multiple-choice questions.

Each question must have:
- "question": a clear, self-contained statement.
- "options": an array of exactly 4 answer options (strings), in order.
- "answer": the zero-based index (0..3) of the correct option.
- "explanation": (optional) a short explanation of why the answer is correct.

RESPOND ONLY with valid JSON: a single array of objects. EXAMPLE:
[
  {
    "id": "q1",
    "question": "What is X?",
    "options": ["A", "B", "C", "D"],
    "answer": 2,
    "explanation": "Because..."
  }
]

Do not include any text outside the JSON array. Do not wrap it in code fences. Make sure the JSON parses."#;

const TEXT_DELIMITER: &str = "----------------";

/// Build the prompt pair for `text` asking for at most `max_questions`.
///
/// `language`, when set, asks for the questions to be written in that
/// language regardless of the document's own.
pub fn build_prompt(text: &str, max_questions: usize, language: Option<&str>) -> PromptPair {
    let mut system = SYSTEM_TEMPLATE.replace("{max_questions}", &max_questions.to_string());
    if let Some(lang) = language {
        system.push_str(&format!("\nWrite every question, option and explanation in {lang}."));
    }

    let closing = match language {
        Some(lang) => format!("Generate clear, pedagogical questions in {lang}."),
        None => "Generate clear, pedagogical questions.".to_string(),
    };

    let user = format!(
        "Document text:\n{TEXT_DELIMITER}\n{text}\n{TEXT_DELIMITER}\n{closing}"
    );

    PromptPair { system, user }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_carries_question_count() {
        let p = build_prompt("text", 7, None);
        assert!(p.system.contains("up to 7 multiple-choice"));
        assert!(!p.system.contains("{max_questions}"));
    }

    #[test]
    fn system_prompt_fixes_json_only_contract() {
        let p = build_prompt("text", 3, None);
        assert!(p.system.contains("exactly 4 answer options"));
        assert!(p.system.contains("zero-based index"));
        assert!(p.system.contains("RESPOND ONLY with valid JSON"));
    }

    #[test]
    fn user_prompt_embeds_text_verbatim() {
        let text = "Photosynthesis converts light into [chemical] energy.";
        let p = build_prompt(text, 5, None);
        assert!(p.user.contains(text));
        assert!(p.user.starts_with("Document text:"));
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(
            build_prompt("abc", 4, Some("Spanish")),
            build_prompt("abc", 4, Some("Spanish"))
        );
    }

    #[test]
    fn language_is_requested_in_both_messages() {
        let p = build_prompt("abc", 4, Some("Spanish"));
        assert!(p.system.ends_with("in Spanish."));
        assert!(p.user.ends_with("questions in Spanish."));
        let plain = build_prompt("abc", 4, None);
        assert!(!plain.system.contains("Spanish"));
    }
}
