//! Quiz data model and the JSON shape exchanged with the generation backend.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Every generated quiz has exactly this many questions.
pub const QUESTION_COUNT: usize = 10;
/// Every question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

/// One multiple-choice question.
///
/// `correct_option` is trusted to be one of `options`; the backend is told to
/// guarantee it and nothing re-checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuizQuestion {
    /// The question text.
    #[serde(rename = "question", alias = "pergunta")]
    text: String,
    /// Exactly four distinct answer options.
    #[serde(alias = "alternativas")]
    options: Vec<String>,
    /// The option that answers the question; must be copied verbatim from `options`.
    #[serde(rename = "correctOption", alias = "respostaCorreta")]
    correct_option: String,
}

impl QuizQuestion {
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options,
            correct_option: correct_option.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        !answer.is_empty() && answer == self.correct_option
    }
}

/// A validated quiz: a non-empty topic and exactly ten four-option questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[schemars(title = "Quiz", description = "A ten-question multiple-choice quiz about a video game")]
pub struct Quiz {
    /// The video game the quiz is about.
    topic: String,
    /// Exactly ten questions.
    questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Build a quiz, or `None` if the shape is wrong.
    pub fn new(topic: impl Into<String>, questions: Vec<QuizQuestion>) -> Option<Self> {
        let topic = topic.into();
        let well_formed = !topic.trim().is_empty()
            && questions.len() == QUESTION_COUNT
            && questions.iter().all(|q| q.options.len() == OPTION_COUNT);

        well_formed.then_some(Self { topic, questions })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// What the backend actually sent, before shape validation.
///
/// Portuguese keys (`assunto`, `perguntas`) are accepted alongside the English
/// ones; models writing pt-BR content sometimes translate the keys too.
#[derive(Debug, Deserialize)]
pub(crate) struct QuizPayload {
    #[serde(default, alias = "assunto")]
    pub topic: Option<String>,
    #[serde(default, alias = "perguntas")]
    pub questions: Option<Vec<QuizQuestion>>,
}

impl QuizPayload {
    pub fn into_quiz(self) -> Option<Quiz> {
        Quiz::new(self.topic?, self.questions?)
    }
}

/// Keys under which the backend reports that it refuses the topic.
pub(crate) const REFUSAL_KEYS: [&str; 2] = ["error", "erro"];

/// The refusal message carried by a parsed response, if any.
///
/// Null, `false` and blank strings do not count as a refusal.
pub(crate) fn refusal_message(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    REFUSAL_KEYS.iter().find_map(|key| match value.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(options: usize) -> QuizQuestion {
        let options: Vec<String> = (0..options).map(|i| format!("opt {i}")).collect();
        QuizQuestion::new("q", options, "opt 0")
    }

    #[test]
    fn quiz_requires_ten_questions_of_four_options() {
        assert!(Quiz::new("Portal", vec![question(4); 10]).is_some());
        assert!(Quiz::new("Portal", vec![question(4); 9]).is_none());
        assert!(Quiz::new("Portal", vec![question(4); 11]).is_none());

        let mut one_short = vec![question(4); 10];
        one_short[7] = question(3);
        assert!(Quiz::new("Portal", one_short).is_none());
    }

    #[test]
    fn quiz_requires_a_topic() {
        assert!(Quiz::new("  ", vec![question(4); 10]).is_none());
    }

    #[test]
    fn empty_answer_is_never_correct() {
        let q = QuizQuestion::new("q", vec![String::new(); 4], "");
        assert!(!q.is_correct(""));
    }

    #[test]
    fn portuguese_keys_are_accepted() {
        let q: QuizQuestion = serde_json::from_value(json!({
            "pergunta": "Quem?",
            "alternativas": ["a", "b", "c", "d"],
            "respostaCorreta": "b"
        }))
        .unwrap();
        assert_eq!(q.text(), "Quem?");
        assert_eq!(q.correct_option(), "b");
    }

    #[test]
    fn refusal_detection() {
        assert_eq!(refusal_message(&json!({"error": "nope"})).as_deref(), Some("nope"));
        assert_eq!(refusal_message(&json!({"erro": "não"})).as_deref(), Some("não"));
        assert_eq!(refusal_message(&json!({"error": ""})), None);
        assert_eq!(refusal_message(&json!({"error": null})), None);
        assert_eq!(refusal_message(&json!({"topic": "x"})), None);
        assert_eq!(
            refusal_message(&json!({"error": {"code": 1}})).as_deref(),
            Some(r#"{"code":1}"#)
        );
    }
}
