pub mod models;

pub use models::DeepSeekModel;

use crate::config::KeyFromEnv;
use crate::core::{LowLevelClient, RawByteStream};
use crate::error::{AIError, ConfigError, DeepSeekError};
use crate::streaming::sse_byte_stream;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const CHAT_COMPLETIONS_URL: &str = "https://api.deepseek.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct DeepSeekRequest {
    model: String,
    messages: Vec<DeepSeekMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct DeepSeekMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponse {
    choices: Vec<DeepSeekChoice>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekChoice {
    message: DeepSeekResponseMessage,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponseMessage {
    content: String,
}

/// Configuration for DeepSeek client
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: String,
    pub model: DeepSeekModel,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DeepSeekModel::default(),
            max_tokens: 4096,
            temperature: 0.3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    client: Client,
}

impl KeyFromEnv for DeepSeekClient {
    const KEY_NAME: &'static str = "DEEPSEEK_API_KEY";
}

impl DeepSeekClient {
    /// Create a new DeepSeek client with full configuration
    pub fn new(config: DeepSeekConfig) -> Self {
        info!(model = %config.model.id(), "Creating new DeepSeek client");
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Create a client using `DEEPSEEK_API_KEY` from the environment or `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = Self::require_key()?;
        Ok(Self::new(DeepSeekConfig {
            api_key,
            ..DeepSeekConfig::default()
        }))
    }

    pub fn with_model(mut self, model: DeepSeekModel) -> Self {
        info!(model = %model.id(), "Setting DeepSeek model");
        self.config.model = model;
        self
    }

    fn request(&self, prompt: String, stream: bool) -> DeepSeekRequest {
        DeepSeekRequest {
            model: self.config.model.id().to_string(),
            messages: vec![DeepSeekMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream,
        }
    }

    fn post(&self, request: &DeepSeekRequest) -> reqwest::RequestBuilder {
        self.client
            .post(CHAT_COMPLETIONS_URL)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(request)
    }
}

async fn check_status(response: Response) -> Result<Response, AIError> {
    if response.status() == 429 {
        warn!("DeepSeek API rate limit exceeded");
        return Err(AIError::DeepSeek(DeepSeekError::RateLimit));
    }

    if response.status() == 401 {
        error!("DeepSeek API authentication failed");
        return Err(AIError::DeepSeek(DeepSeekError::Authentication));
    }

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(status = %status, error = %error_text, "DeepSeek API error");
        return Err(AIError::DeepSeek(DeepSeekError::Api(error_text)));
    }

    Ok(response)
}

#[async_trait]
impl LowLevelClient for DeepSeekClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        debug!(model = %self.config.model.id(), prompt_len = prompt.len(), "Preparing DeepSeek API request");

        let request = self.request(prompt, false);

        debug!("Sending request to DeepSeek API");
        let response = self.post(&request).send().await.map_err(|e| {
            error!(error = %e, "HTTP request failed");
            AIError::DeepSeek(DeepSeekError::Http(e.to_string()))
        })?;

        debug!(status = %response.status(), "Received response from DeepSeek API");
        let response = check_status(response).await?;

        let deepseek_response: DeepSeekResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse DeepSeek response JSON");
            AIError::DeepSeek(DeepSeekError::Http(e.to_string()))
        })?;

        debug!(choices_count = deepseek_response.choices.len(), "Parsed DeepSeek response");

        let result = deepseek_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                error!("No choices in DeepSeek response");
                AIError::DeepSeek(DeepSeekError::Api("No choices in response".to_string()))
            });

        match &result {
            Ok(text) => info!(response_len = text.len(), "Successfully received DeepSeek response"),
            Err(e) => error!(error = %e, "Failed to extract content from DeepSeek response"),
        }

        result
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }

    // Chunks use the OpenAI-compatible shape, so the default `sse_delta` applies.
    fn stream_raw(&self, prompt: String) -> Option<RawByteStream> {
        let request = self.post(&self.request(prompt, true));
        let open = async move {
            let response = request
                .send()
                .await
                .map_err(|e| AIError::DeepSeek(DeepSeekError::Http(e.to_string())))?;
            check_status(response).await
        };
        Some(sse_byte_stream(open, |message| AIError::DeepSeek(DeepSeekError::Http(message))))
    }
}
