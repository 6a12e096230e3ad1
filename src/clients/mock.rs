use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::core::{LowLevelClient, RawByteStream};
use crate::error::AIError;

/// One scripted reply of a [`MockClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// The model "says" this text.
    Text(String),
    /// The call fails with `AIError::Mock(message)`.
    Error(String),
}

impl MockResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }
}

/// Shared control surface of a [`MockClient`]: queue replies, inspect prompts.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
    chunk_size: Mutex<usize>,
    fallback: Mutex<Option<MockResponse>>,
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(MockResponse::text(text));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.push(MockResponse::error(message));
    }

    /// Every prompt received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }

    /// Split streamed replies into SSE events of at most this many bytes.
    pub fn set_chunk_size(&self, size: usize) {
        *lock(&self.chunk_size) = size.max(1);
    }

    /// Reply with `response` whenever the scripted queue is empty.
    pub fn set_fallback(&self, response: MockResponse) {
        *lock(&self.fallback) = Some(response);
    }

    fn next_response(&self, prompt: String) -> MockResponse {
        lock(&self.prompts).push(prompt);
        if let Some(response) = lock(&self.responses).pop_front() {
            return response;
        }
        lock(&self.fallback)
            .clone()
            .unwrap_or_else(|| MockResponse::error("no scripted response"))
    }

    fn chunk_size(&self) -> usize {
        let size = *lock(&self.chunk_size);
        if size == 0 { 16 } else { size }
    }
}

// A panicking test thread must not wedge every other user of the handle.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A valid ten-question quiz, served by [`MockClient::demo`] for every prompt.
pub const DEMO_QUIZ: &str = include_str!("mock/demo_quiz.json");

/// Scripted client for tests and offline runs. Never touches the network.
#[derive(Debug, Clone)]
pub struct MockClient {
    handle: Arc<MockHandle>,
}

impl MockClient {
    pub fn new() -> (Self, Arc<MockHandle>) {
        Self::with_responses(Vec::new())
    }

    /// A client that answers every prompt with [`DEMO_QUIZ`], for trying the UI offline.
    pub fn demo() -> (Self, Arc<MockHandle>) {
        let (client, handle) = Self::new();
        handle.set_fallback(MockResponse::text(DEMO_QUIZ));
        (client, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        for response in responses {
            handle.push(response);
        }
        (Self { handle: handle.clone() }, handle)
    }
}

#[async_trait]
impl LowLevelClient for MockClient {
    async fn ask_raw(&self, prompt: String) -> Result<String, AIError> {
        match self.handle.next_response(prompt) {
            MockResponse::Text(text) => Ok(text),
            MockResponse::Error(message) => Err(AIError::Mock(message)),
        }
    }

    fn clone_box(&self) -> Box<dyn LowLevelClient> {
        Box::new(self.clone())
    }

    /// Replays the scripted text as OpenAI-style SSE events. Event boundaries
    /// fall on arbitrary byte offsets of the SSE body, not on line ends.
    fn stream_raw(&self, prompt: String) -> Option<RawByteStream> {
        let response = self.handle.next_response(prompt);
        let chunk_size = self.handle.chunk_size();

        let items: Vec<Result<Bytes, AIError>> = match response {
            MockResponse::Error(message) => vec![Err(AIError::Mock(message))],
            MockResponse::Text(text) => {
                let body = sse_body(&text, chunk_size);
                debug!(body_len = body.len(), "replaying scripted text as SSE");
                body.as_bytes()
                    .chunks(7)
                    .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
                    .collect()
            }
        };

        Some(Box::pin(futures_util::stream::iter(items)))
    }
}

fn sse_body(text: &str, chunk_size: usize) -> String {
    let mut body = String::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        let event = serde_json::json!({
            "choices": [{ "delta": { "content": &text[start..end] } }]
        });
        body.push_str(&format!("data: {}\n\n", event));
        start = end;
    }
    body.push_str("data: [DONE]\n\n");
    body
}
