//! The generation capability: a prompt goes in, model text comes out.
//!
//! Everything above this layer (prompting, fence stripping, validation) is
//! backend-agnostic; everything below it is a concrete vendor API.

use crate::error::AIError;
use async_trait::async_trait;
use bytes::Bytes;
use futures_core::Stream;
use std::fmt::Debug;
use std::pin::Pin;

/// Type alias for raw byte streams from AI providers
pub type RawByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, AIError>> + Send>>;

/// Low-level model client abstraction.
///
/// Implementors provide `ask_raw`, which executes a prompt and returns the raw
/// model text. Parsing and validation happen in `QuizGenerator`.
#[async_trait]
pub trait LowLevelClient: Send + Sync + Debug {
    /// The only method that implementations must provide
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError>;

    /// Clone this client into a boxed trait object
    fn clone_box(&self) -> Box<dyn LowLevelClient>;

    /// Optional: provide a streaming raw response as Server-Sent Event bytes.
    /// Default is None; providers can override to implement true streaming.
    fn stream_raw(&self, _prompt: String) -> Option<RawByteStream> {
        None
    }

    /// Extract the text delta carried by one SSE `data:` payload.
    ///
    /// The default understands the OpenAI-compatible `choices[0].delta.content` shape.
    fn sse_delta(&self, event: &serde_json::Value) -> Option<String> {
        event
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c0| c0.get("delta"))
            .and_then(|d| d.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
    }
}

// Implement Clone for Box<dyn LowLevelClient>
impl Clone for Box<dyn LowLevelClient> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// Implement LowLevelClient for Box<dyn LowLevelClient>
#[async_trait]
impl LowLevelClient for Box<dyn LowLevelClient> {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().ask_raw(prompt).await
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        self.as_ref().clone_box()
    }

    fn stream_raw(&self, prompt: String) -> Option<RawByteStream> {
        self.as_ref().stream_raw(prompt)
    }

    fn sse_delta(&self, event: &serde_json::Value) -> Option<String> {
        self.as_ref().sse_delta(event)
    }
}
