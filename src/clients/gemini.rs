pub mod models;

pub use models::GeminiModel;

use crate::config::KeyFromEnv;
use crate::core::{LowLevelClient, RawByteStream};
use crate::error::{AIError, ConfigError, GeminiError};
use crate::streaming::sse_byte_stream;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// All text parts of the first candidate, concatenated.
    fn first_candidate_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        Some(text)
    }
}

/// Configuration for Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: GeminiModel,
    pub base_url: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: GeminiModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_output_tokens: 8192,
            temperature: 0.7,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl KeyFromEnv for GeminiClient {
    const KEY_NAME: &'static str = "GOOGLE_API_KEY";
}

impl GeminiClient {
    /// Create a new Gemini client with full configuration
    pub fn new(config: GeminiConfig) -> Self {
        info!(model = %config.model.id(), "Creating new Gemini client");
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Create a client using `GOOGLE_API_KEY` from the environment or `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = Self::require_key()?;
        Ok(Self::new(GeminiConfig {
            api_key,
            ..GeminiConfig::default()
        }))
    }

    pub fn with_model(mut self, model: GeminiModel) -> Self {
        info!(model = %model.id(), "Setting Gemini model");
        self.config.model = model;
        self
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model.id(),
            method
        )
    }

    // The key travels in a header so it never appears in a URL, and so never in an error message.
    fn post(&self, method: &str) -> RequestBuilder {
        self.client
            .post(self.url(method))
            .header(API_KEY_HEADER, &self.config.api_key)
    }

    fn body(&self, prompt: String) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

fn http_error(e: reqwest::Error) -> AIError {
    AIError::Gemini(GeminiError::Http(e.without_url().to_string()))
}

/// Map a non-success status to the matching error, or hand the response back.
async fn check_status(response: Response) -> Result<Response, AIError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("Gemini API rate limit exceeded");
        return Err(AIError::Gemini(GeminiError::RateLimit));
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        error!("Gemini API authentication failed");
        return Err(AIError::Gemini(GeminiError::Authentication));
    }

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(status = %status, error = %error_text, "Gemini API error");
        return Err(AIError::Gemini(GeminiError::Api(error_text)));
    }

    Ok(response)
}

#[async_trait]
impl LowLevelClient for GeminiClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        debug!(model = %self.config.model.id(), prompt_len = prompt.len(), "Preparing Gemini API request");

        let response = self
            .post("generateContent")
            .json(&self.body(prompt))
            .send()
            .await
            .map_err(|e| {
                let e = http_error(e);
                error!(error = %e, "HTTP request failed");
                e
            })?;

        debug!(status = %response.status(), "Received response from Gemini API");
        let response = check_status(response).await?;

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            let e = http_error(e);
            error!(error = %e, "Failed to parse Gemini response JSON");
            e
        })?;

        debug!(candidates = gemini_response.candidates.len(), "Parsed Gemini response");

        let result = gemini_response.first_candidate_text().ok_or_else(|| {
            error!("No candidates in Gemini response");
            AIError::Gemini(GeminiError::Api("No candidates in response".to_string()))
        });

        if let Ok(text) = &result {
            info!(response_len = text.len(), "Successfully received Gemini response");
        }

        result
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }

    fn stream_raw(&self, prompt: String) -> Option<RawByteStream> {
        let request = self
            .post("streamGenerateContent")
            .query(&[("alt", "sse")])
            .json(&self.body(prompt));

        let open = async move {
            let response = request.send().await.map_err(http_error)?;
            check_status(response).await
        };
        Some(sse_byte_stream(open, |message| AIError::Gemini(GeminiError::Http(message))))
    }

    fn sse_delta(&self, event: &serde_json::Value) -> Option<String> {
        serde_json::from_value::<GeminiResponse>(event.clone())
            .ok()?
            .first_candidate_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::QuizGenerator;
    use serde_json::json;

    const SECRET: &str = "SUPERSECRETKEY123";

    // Nothing listens on port 1, so every request fails at connect time.
    fn unreachable_client() -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: SECRET.to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            ..GeminiConfig::default()
        })
    }

    #[test]
    fn api_key_is_sent_as_a_header() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: SECRET.to_string(),
            ..GeminiConfig::default()
        });
        let request = client.post("generateContent").build().unwrap();

        assert!(!request.url().as_str().contains(SECRET));
        assert_eq!(request.url().query(), None);
        assert_eq!(request.headers()[API_KEY_HEADER], SECRET);
    }

    #[tokio::test]
    async fn connection_failure_does_not_reveal_the_key() {
        let failure = QuizGenerator::new(unreachable_client())
            .generate("Zelda")
            .await
            .unwrap_err();

        let reason = failure.reason();
        assert!(reason.starts_with("error generating quiz:"), "{reason}");
        assert!(!reason.contains(SECRET), "{reason}");
    }

    #[tokio::test]
    async fn streamed_connection_failure_does_not_reveal_the_key() {
        let failure = QuizGenerator::new(unreachable_client())
            .with_streaming(true)
            .generate("Zelda")
            .await
            .unwrap_err();

        assert!(!failure.reason().contains(SECRET), "{}", failure.reason());
    }

    #[test]
    fn request_body_shape() {
        let client = GeminiClient::new(GeminiConfig::default());
        let body = serde_json::to_value(client.body("hi".to_string())).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn url_includes_model_and_method() {
        let client = GeminiClient::new(GeminiConfig::default());
        assert_eq!(
            client.url("generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn sse_delta_joins_parts() {
        let client = GeminiClient::new(GeminiConfig::default());
        let event = json!({
            "candidates": [{"content": {"parts": [{"text": "{\"to"}, {"text": "pic\""}]}}]
        });
        assert_eq!(client.sse_delta(&event).as_deref(), Some("{\"topic\""));
        assert_eq!(client.sse_delta(&json!({"usageMetadata": {}})), None);
    }
}
