use crate::quiz::{Quiz, OPTION_COUNT, QUESTION_COUNT};
use schemars::schema_for;

/// The language every question and option must be written in.
pub const TARGET_LANGUAGE: &str = "Brazilian Portuguese (pt-BR)";

/// Build the instruction prompt for a topic.
///
/// The output depends only on `topic`: the same topic always yields the same prompt.
pub fn build_prompt(topic: &str) -> String {
    let schema = schema_for!(Quiz);
    let schema_json = serde_json::to_string_pretty(&schema)
        .unwrap_or_else(|_| "Schema serialization failed".to_string());

    format!(
        r#"Create a multiple-choice quiz about the video game topic: "{topic}".

Rules:
- Write exactly {QUESTION_COUNT} questions.
- Every question has exactly {OPTION_COUNT} distinct answer options, and exactly one of them is correct.
- The correct option MUST be copied verbatim from that question's options.
- Focus on facts, lore, characters, places, items and mechanics of the game. Vary the aspects covered.
- Questions and answers must be factually correct, clear and direct, answerable by players of any level.
- Avoid subjective questions, questions with more than one defensible answer, and offensive content.
- Write ALL questions and options in {TARGET_LANGUAGE}.

If the topic is not clearly a video game, do not write a quiz. Instead reply with an error object, written in {TARGET_LANGUAGE}, explaining that the topic is not appropriate:
{{"error": "O assunto 'Futebol' não é apropriado para um questionário de videogames."}}

Reply with ONLY a single JSON object. Do not add any text before or after it.

Example for a valid topic:
{{
  "topic": "Five Nights at Freddy's",
  "questions": [
    {{
      "question": "Quem é o principal antagonista da série Five Nights at Freddy's?",
      "options": ["Freddy Fazbear", "Bonnie", "Chica", "Springtrap"],
      "correctOption": "Springtrap"
    }}
  ]
}}
(the real reply contains all {QUESTION_COUNT} questions)

## Response Format
The quiz object must match this JSON schema:
```json
{schema_json}
```"#
    )
}
