use crate::core::RawByteStream;
use crate::error::AIError;
use async_stream::stream;
use futures_util::StreamExt;
use std::future::Future;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::io::StreamReader;
use tracing::{debug, instrument, trace};

/// Drain a Server-Sent Events byte stream into the complete response text.
///
/// Every `data:` line is decoded as JSON and handed to `delta`, which picks the
/// text fragment out of the provider-specific event shape. Fragments are
/// concatenated in arrival order. Reading stops at end of stream or at a
/// `[DONE]` sentinel. Payloads that are not JSON are skipped.
///
/// A transport error anywhere in the stream fails the whole drain: callers
/// never see a partial response.
#[instrument(target = "quizcraft::stream", skip_all)]
pub async fn drain_sse_text<F>(byte_stream: RawByteStream, delta: F) -> Result<String, AIError>
where
    F: Fn(&serde_json::Value) -> Option<String>,
{
    let io_stream = byte_stream.map(|res| {
        res.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    });
    let reader = StreamReader::new(io_stream);
    let mut lines = BufReader::new(reader).lines();

    let mut text = String::new();
    let mut events = 0usize;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(recover_ai_error(e)),
        };

        let Some(payload) = line.strip_prefix("data:") else {
            continue;
        };
        let payload = payload.trim();
        if payload == "[DONE]" {
            debug!(target = "quizcraft::stream", "received [DONE] sentinel");
            break;
        }

        match serde_json::from_str::<serde_json::Value>(payload) {
            Ok(event) => {
                events += 1;
                if let Some(fragment) = delta(&event) {
                    trace!(target = "quizcraft::stream", fragment_len = fragment.len(), "delta");
                    text.push_str(&fragment);
                }
            }
            Err(e) => debug!(target = "quizcraft::stream", error = %e, "skipping non-JSON data line"),
        }
    }

    debug!(target = "quizcraft::stream", events, text_len = text.len(), "stream drained");
    Ok(text)
}

// Provider errors travel through the reader wrapped in io::Error; unwrap them again.
fn recover_ai_error(e: std::io::Error) -> AIError {
    let message = e.to_string();
    match e.into_inner().map(|inner| inner.downcast::<AIError>()) {
        Some(Ok(ai)) => *ai,
        Some(Err(other)) => AIError::Stream(other.to_string()),
        None => AIError::Stream(message),
    }
}

/// Turn a pending HTTP response into a raw byte stream.
///
/// `open` sends the request and checks its status; an error there becomes the
/// single item of the stream. Body read failures are mapped with `http_error`.
pub(crate) fn sse_byte_stream<Fut>(open: Fut, http_error: fn(String) -> AIError) -> RawByteStream
where
    Fut: Future<Output = Result<reqwest::Response, AIError>> + Send + 'static,
{
    let s = stream! {
        let response = match open.await {
            Ok(response) => response,
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let mut bytes_stream = response.bytes_stream();
        while let Some(chunk) = bytes_stream.next().await {
            yield chunk.map_err(|e| http_error(e.without_url().to_string()));
        }
    };
    Box::pin(s)
}
