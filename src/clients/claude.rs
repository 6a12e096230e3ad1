pub mod models;

pub use models::ClaudeModel;

use crate::config::KeyFromEnv;
use crate::core::{LowLevelClient, RawByteStream};
use crate::error::{AIError, ClaudeError, ConfigError};
use crate::streaming::sse_byte_stream;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    pub model: ClaudeModel,
    pub max_tokens: u32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: ClaudeModel::default(),
            max_tokens: 4096,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClaudeClient {
    config: ClaudeConfig,
    client: Client,
}

impl KeyFromEnv for ClaudeClient {
    const KEY_NAME: &'static str = "ANTHROPIC_API_KEY";
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig) -> Self {
        info!(model = %config.model.id(), "Creating new Claude client");
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Create a client using `ANTHROPIC_API_KEY` from the environment or `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = Self::require_key()?;
        Ok(Self::new(ClaudeConfig {
            api_key,
            ..ClaudeConfig::default()
        }))
    }

    pub fn with_model(mut self, model: ClaudeModel) -> Self {
        info!(model = %model.id(), "Setting Claude model");
        self.config.model = model;
        self
    }

    fn request(&self, prompt: String, stream: bool) -> ClaudeRequest {
        ClaudeRequest {
            model: self.config.model.id().to_string(),
            max_tokens: self.config.max_tokens,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            stream,
        }
    }

    fn post(&self, request: &ClaudeRequest) -> reqwest::RequestBuilder {
        self.client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
    }
}

async fn check_status(response: Response) -> Result<Response, AIError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("Claude API rate limit exceeded");
        return Err(AIError::Claude(ClaudeError::RateLimit));
    }

    if status == StatusCode::UNAUTHORIZED {
        error!("Claude API authentication failed");
        return Err(AIError::Claude(ClaudeError::Authentication));
    }

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(status = %status, error = %error_text, "Claude API error");
        return Err(AIError::Claude(ClaudeError::Api(error_text)));
    }

    Ok(response)
}

#[async_trait]
impl LowLevelClient for ClaudeClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        debug!(model = %self.config.model.id(), prompt_len = prompt.len(), "Preparing Claude API request");

        let request = self.request(prompt, false);
        let response = self.post(&request).send().await.map_err(|e| {
            error!(error = %e, "HTTP request failed");
            AIError::Claude(ClaudeError::Http(e.to_string()))
        })?;

        debug!(status = %response.status(), "Received response from Claude API");
        let response = check_status(response).await?;

        let claude_response: ClaudeResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse Claude response JSON");
            AIError::Claude(ClaudeError::Http(e.to_string()))
        })?;

        debug!(content_count = claude_response.content.len(), "Parsed Claude response");

        let result = claude_response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                error!("No text content in Claude response");
                AIError::Claude(ClaudeError::Api("No content in response".to_string()))
            });

        if let Ok(text) = &result {
            info!(response_len = text.len(), "Successfully received Claude response");
        }

        result
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }

    fn stream_raw(&self, prompt: String) -> Option<RawByteStream> {
        let request = self.post(&self.request(prompt, true));
        let open = async move {
            let response = request
                .send()
                .await
                .map_err(|e| AIError::Claude(ClaudeError::Http(e.to_string())))?;
            check_status(response).await
        };
        Some(sse_byte_stream(open, |message| AIError::Claude(ClaudeError::Http(message))))
    }

    // Only `content_block_delta` events carry text.
    fn sse_delta(&self, event: &serde_json::Value) -> Option<String> {
        if event.get("type")?.as_str()? != "content_block_delta" {
            return None;
        }
        event
            .get("delta")
            .and_then(|d| d.get("text"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_flag_only_serialized_when_set() {
        let client = ClaudeClient::new(ClaudeConfig::default());
        let plain = serde_json::to_value(client.request("hi".into(), false)).unwrap();
        assert!(plain.get("stream").is_none());
        let streamed = serde_json::to_value(client.request("hi".into(), true)).unwrap();
        assert_eq!(streamed["stream"], true);
        assert_eq!(streamed["messages"][0]["content"], "hi");
    }

    #[test]
    fn sse_delta_reads_content_block_deltas_only() {
        let client = ClaudeClient::new(ClaudeConfig::default());
        let delta = json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "{\"q"}});
        assert_eq!(client.sse_delta(&delta).as_deref(), Some("{\"q"));
        assert_eq!(client.sse_delta(&json!({"type": "message_start", "message": {}})), None);
    }
}
