//! Topic in, validated quiz (or a reason why not) out.
//!
//! One call to [`QuizGenerator::generate`] is exactly one request to the
//! backend. Nothing is retried: transport errors, refusals and malformed
//! output all come back as a [`GenerationFailure`].

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::core::LowLevelClient;
use crate::error::{AIError, GenerationFailure};
use crate::interceptors::Interceptor;
use crate::json_utils::strip_code_fence;
use crate::prompt::build_prompt;
use crate::quiz::{refusal_message, Quiz, QuizPayload};
use crate::streaming::drain_sse_text;

/// `Ok` is a validated quiz, `Err` carries the user-facing failure reason.
pub type GenerationResult = Result<Quiz, GenerationFailure>;

#[derive(Debug, Clone)]
pub struct QuizGenerator<C: LowLevelClient> {
    client: C,
    stream: bool,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<C: LowLevelClient> QuizGenerator<C> {
    pub fn new(client: C) -> Self {
        info!("Creating new QuizGenerator");
        Self {
            client,
            stream: false,
            interceptor: None,
        }
    }

    /// Prefer the backend's streaming endpoint. The stream is always drained
    /// completely before anything is parsed.
    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn is_streaming(&self) -> bool {
        self.stream
    }

    /// Generate a ten-question quiz about `topic`.
    ///
    /// The topic is not checked locally; deciding whether it is a video game
    /// is left to the backend, which answers with an error object if not.
    #[instrument(target = "quizcraft::generator", skip(self), fields(streaming = self.stream))]
    pub async fn generate(&self, topic: &str) -> GenerationResult {
        let prompt = build_prompt(topic);
        info!(prompt_len = prompt.len(), "Requesting quiz");

        let raw = self.fetch(prompt.clone()).await.map_err(|e| {
            error!(error = %e, "Generation request failed");
            GenerationFailure::Transport(e)
        })?;
        debug!(raw = %raw, "Raw generation response");

        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(topic, &prompt, &raw).await {
                warn!(error = %e, "Failed to save generation transcript");
            }
        }

        let result = parse_quiz(&raw);
        match &result {
            Ok(quiz) => info!(topic = %quiz.topic(), questions = quiz.len(), "Quiz generated"),
            Err(failure) => warn!(reason = %failure, "Quiz generation failed"),
        }
        result
    }

    async fn fetch(&self, prompt: String) -> Result<String, AIError> {
        if self.stream {
            if let Some(stream) = self.client.stream_raw(prompt.clone()) {
                return drain_sse_text(stream, |event| self.client.sse_delta(event)).await;
            }
            debug!("Client does not support streaming, using a single request");
        }
        self.client.ask_raw(prompt).await
    }
}

/// Turn raw backend text into a quiz.
///
/// Steps, in order: strip a Markdown code fence, parse JSON, honour an
/// `error` refusal object, then check the quiz shape (topic present, ten
/// questions, four options each). `correctOption` membership is not checked.
#[instrument(target = "quizcraft::generator", skip(raw), fields(raw_len = raw.len()))]
pub fn parse_quiz(raw: &str) -> GenerationResult {
    let normalized = strip_code_fence(raw);

    let value: serde_json::Value =
        serde_json::from_str(normalized).map_err(|source| GenerationFailure::Unparsable {
            source,
            raw: raw.to_string(),
        })?;

    if let Some(message) = refusal_message(&value) {
        return Err(GenerationFailure::Refused(message));
    }

    let payload: QuizPayload = serde_json::from_value(value).map_err(|e| {
        debug!(error = %e, "Response JSON does not match the quiz shape");
        GenerationFailure::InvalidQuiz
    })?;

    payload.into_quiz().ok_or(GenerationFailure::InvalidQuiz)
}
