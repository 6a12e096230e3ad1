use crate::clients::{
    ClaudeClient, ClaudeModel, DeepSeekClient, DeepSeekModel, GeminiClient, GeminiModel,
    MockClient, MockHandle, MockResponse,
};
use crate::config::{AppConfig, ProviderKind};
use crate::core::{LowLevelClient, RawByteStream};
use crate::error::{AIError, ConfigError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
/// Flexible client that wraps any LowLevelClient and provides factory functions
pub struct FlexibleClient {
    inner: Arc<dyn LowLevelClient>,
}

impl FlexibleClient {
    /// Create a new FlexibleClient wrapping the given client
    pub fn new(client: Box<dyn LowLevelClient>) -> Self {
        Self {
            inner: Arc::from(client),
        }
    }

    /// Build the backend named by the configuration.
    ///
    /// Fails when the backend's API key is missing; callers treat that as fatal.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let model = config.model.as_deref();
        info!(provider = %config.provider, model = ?model, "Building generation client");

        let client: Box<dyn LowLevelClient> = match config.provider {
            ProviderKind::Gemini => {
                let client = GeminiClient::from_env()?;
                Box::new(match model {
                    Some(id) => client.with_model(GeminiModel::from(id)),
                    None => client,
                })
            }
            ProviderKind::Claude => {
                let client = ClaudeClient::from_env()?;
                Box::new(match model {
                    Some(id) => client.with_model(ClaudeModel::from(id)),
                    None => client,
                })
            }
            ProviderKind::DeepSeek => {
                let client = DeepSeekClient::from_env()?;
                Box::new(match model {
                    Some(id) => client.with_model(DeepSeekModel::from(id)),
                    None => client,
                })
            }
            ProviderKind::Mock => Box::new(MockClient::demo().0),
        };

        Ok(Self::new(client))
    }

    /// Create a FlexibleClient with a mock and return the handle for configuration
    pub fn mock() -> (Self, Arc<MockHandle>) {
        let (mock_client, handle) = MockClient::new();
        (Self::new(Box::new(mock_client)), handle)
    }

    /// Create a FlexibleClient mock with predefined responses
    pub fn new_mock_with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (mock_client, handle) = MockClient::with_responses(responses);
        (Self::new(Box::new(mock_client)), handle)
    }

    /// Convert into a boxed client
    pub fn into_inner(self) -> Box<dyn LowLevelClient> {
        self.inner.clone_box()
    }
}

#[async_trait]
impl LowLevelClient for FlexibleClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.inner.ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }

    fn stream_raw(&self, prompt: String) -> Option<RawByteStream> {
        self.inner.stream_raw(prompt)
    }

    fn sse_delta(&self, event: &serde_json::Value) -> Option<String> {
        self.inner.sse_delta(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::QuizGenerator;
    use crate::quiz::QUESTION_COUNT;

    #[tokio::test]
    async fn mock_config_serves_the_demo_quiz() {
        let config = AppConfig {
            provider: ProviderKind::Mock,
            ..AppConfig::default()
        };
        let generator = QuizGenerator::new(FlexibleClient::from_config(&config).unwrap());

        for _ in 0..2 {
            let quiz = generator.generate("Mario").await.unwrap();
            assert_eq!(quiz.topic(), "Super Mario Bros.");
            assert_eq!(quiz.len(), QUESTION_COUNT);
        }
    }

    #[tokio::test]
    async fn bare_mock_has_nothing_scripted() {
        let (client, _) = FlexibleClient::mock();
        assert!(matches!(client.ask_raw("x".into()).await, Err(AIError::Mock(_))));
    }

    #[tokio::test]
    async fn forwards_to_the_wrapped_client() {
        let (client, handle) = FlexibleClient::new_mock_with_responses(vec![MockResponse::text("ok")]);
        assert_eq!(client.clone().ask_raw("p".into()).await.unwrap(), "ok");
        assert_eq!(handle.call_count(), 1);
    }
}
