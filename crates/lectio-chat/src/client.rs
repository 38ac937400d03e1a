//! Chat-completions HTTP client.

use crate::error::{ChatError, ChatResult};
use crate::types::{ChatRequest, ChatResponse, StreamChunk};
use futures_util::StreamExt;
use lectio_config::AiConfig;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

/// The terminal payload of a streaming response.
const DONE_SENTINEL: &str = "[DONE]";

/// Client for an OpenAI-compatible /chat/completions endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl ChatClient {
    /// Create a new client from configuration.
    pub fn from_config(config: &AiConfig) -> ChatResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(ChatError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.request_timeout_seconds),
        })
    }

    /// Create a new client with default timeouts.
    pub fn new(base_url: impl Into<String>) -> ChatResult<Self> {
        let base_url = base_url.into();
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(ChatError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(300),
        })
    }

    /// Check the API key format before any network call.
    ///
    /// Keys must be non-blank and carry the `sk-` prefix.
    pub fn validate_api_key(api_key: &str) -> ChatResult<()> {
        if api_key.trim().is_empty() {
            return Err(ChatError::InvalidApiKey(
                "API key must not be blank".to_string(),
            ));
        }
        if !api_key.starts_with("sk-") {
            return Err(ChatError::InvalidApiKey(
                "API key must start with 'sk-'".to_string(),
            ));
        }
        Ok(())
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ChatError {
        if e.is_connect() {
            ChatError::Network(format!("Failed to connect to chat API: {}", e))
        } else if e.is_timeout() {
            ChatError::Timeout {
                seconds: self.request_timeout.as_secs(),
            }
        } else {
            ChatError::Http(e)
        }
    }

    /// Run a blocking (non-streaming) completion and return the first
    /// choice's message content.
    pub async fn complete(&self, api_key: &str, request: ChatRequest) -> ChatResult<String> {
        Self::validate_api_key(api_key)?;

        // Ensure streaming is off for this method
        let mut request = request;
        request.stream = false;

        debug!("Sending completion request, model: {}", request.model);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .timeout(self.request_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(ChatError::Http)?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }

        info!("Completion succeeded, content length: {}", content.len());
        Ok(content)
    }

    /// Run a streaming completion.
    ///
    /// Returns a [`ChatStream`] yielding events in exactly the order the
    /// server sent them: zero or more `Content` chunks, then either one
    /// `Done` (the `[DONE]` sentinel) or one `Error`, after which nothing
    /// further is delivered. Dropping or cancelling the stream aborts the
    /// underlying transfer.
    pub async fn complete_stream(
        &self,
        api_key: &str,
        request: ChatRequest,
    ) -> ChatResult<ChatStream> {
        Self::validate_api_key(api_key)?;

        // Ensure streaming is on
        let mut request = request;
        request.stream = true;

        debug!("Opening streaming completion, model: {}", request.model);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let (tx, rx) = mpsc::channel(100);

        let task = tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buf: Vec<u8> = Vec::new();

            while let Some(chunk_result) = stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!("Stream transport error: {}", e);
                        let _ = tx.send(ChatStreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };

                buf.extend_from_slice(&bytes);

                while let Some((pos, sep_len)) = find_frame_boundary(&buf) {
                    let frame: Vec<u8> = buf.drain(..pos + sep_len).collect();
                    let text = String::from_utf8_lossy(&frame);

                    for line in text.lines() {
                        let line = line.trim();
                        let Some(data) = line.strip_prefix("data:") else {
                            continue;
                        };
                        let data = data.trim();

                        if data == DONE_SENTINEL {
                            let _ = tx.send(ChatStreamEvent::Done).await;
                            return;
                        }
                        if data.is_empty() {
                            continue;
                        }

                        match serde_json::from_str::<StreamChunk>(data) {
                            Ok(chunk) => {
                                let content = chunk
                                    .choices
                                    .into_iter()
                                    .next()
                                    .and_then(|choice| choice.delta.content);
                                // A present content field is forwarded even
                                // when empty or whitespace-only.
                                if let Some(content) = content {
                                    if tx.send(ChatStreamEvent::Content(content)).await.is_err() {
                                        return; // Receiver dropped
                                    }
                                }
                            }
                            Err(e) => {
                                warn!("Skipping malformed stream event: {} - {}", e, data);
                            }
                        }
                    }
                }
            }

            // EOF without the [DONE] sentinel: the protocol treats this as
            // an abnormal end, not a completion.
            warn!("Stream closed without terminal sentinel");
            let _ = tx
                .send(ChatStreamEvent::Error(
                    "stream closed before completion".to_string(),
                ))
                .await;
        });

        Ok(ChatStream {
            events: rx,
            handle: StreamHandle {
                abort: task.abort_handle(),
            },
        })
    }
}

/// One event delivered by a [`ChatStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStreamEvent {
    /// An incremental content fragment, in arrival order.
    Content(String),
    /// The `[DONE]` sentinel was received; the stream is finished.
    Done,
    /// The stream failed; no further events follow.
    Error(String),
}

/// Cancel handle for an in-flight streaming completion.
#[derive(Debug)]
pub struct StreamHandle {
    abort: AbortHandle,
}

impl StreamHandle {
    /// Terminate the underlying transfer. Safe to call repeatedly; once
    /// cancelled no further events are delivered.
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

/// An open streaming completion.
#[derive(Debug)]
pub struct ChatStream {
    events: mpsc::Receiver<ChatStreamEvent>,
    handle: StreamHandle,
}

impl ChatStream {
    /// Receive the next event. `None` means the stream ended without a
    /// terminal event (cancelled, or the reader task stopped).
    pub async fn next_event(&mut self) -> Option<ChatStreamEvent> {
        self.events.recv().await
    }

    /// Cancel the stream; idempotent.
    pub fn cancel(&self) {
        self.handle.cancel();
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

/// Find the end of the next SSE frame: `\n\n` or `\r\n\r\n`.
fn find_frame_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|p| (p, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const KEY: &str = "sk-test-key";

    fn sse_body(frames: &[&str]) -> String {
        frames
            .iter()
            .map(|data| format!("data: {}\n\n", data))
            .collect()
    }

    #[test]
    fn test_validate_api_key() {
        assert!(ChatClient::validate_api_key("sk-abc123").is_ok());
        assert!(matches!(
            ChatClient::validate_api_key(""),
            Err(ChatError::InvalidApiKey(_))
        ));
        assert!(matches!(
            ChatClient::validate_api_key("   "),
            Err(ChatError::InvalidApiKey(_))
        ));
        assert!(matches!(
            ChatClient::validate_api_key("pk-wrong"),
            Err(ChatError::InvalidApiKey(_))
        ));
    }

    #[test]
    fn test_find_frame_boundary() {
        assert_eq!(find_frame_boundary(b"data: a\n\nrest"), Some((7, 2)));
        assert_eq!(find_frame_boundary(b"data: a\r\n\r\nrest"), Some((7, 4)));
        assert_eq!(find_frame_boundary(b"data: partial"), None);
    }

    #[tokio::test]
    async fn test_complete_returns_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", format!("Bearer {}", KEY))
                    .json_body_partial(r#"{"stream": false}"#);
                then.status(200).json_body(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "A fine guide."}}]
                }));
            })
            .await;

        let client = ChatClient::new(server.base_url()).unwrap();
        let request = ChatRequest::new("moonshot-v1-8k", "system", "user");
        let content = client.complete(KEY, request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(content, "A fine guide.");
    }

    #[tokio::test]
    async fn test_complete_maps_upstream_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body("invalid key");
            })
            .await;

        let client = ChatClient::new(server.base_url()).unwrap();
        let request = ChatRequest::new("m", "s", "u");
        let err = client.complete(KEY, request).await.unwrap_err();

        match err {
            ChatError::Upstream { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid key");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_rejects_blank_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "   "}}]
                }));
            })
            .await;

        let client = ChatClient::new(server.base_url()).unwrap();
        let request = ChatRequest::new("m", "s", "u");
        let err = client.complete(KEY, request).await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_invalid_key_fails_before_network() {
        // No server: a network attempt would error differently.
        let client = ChatClient::new("http://127.0.0.1:1").unwrap();
        let request = ChatRequest::new("m", "s", "u");
        let err = client.complete("bad-key", request).await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidApiKey(_)));
    }

    #[tokio::test]
    async fn test_stream_preserves_order_and_whitespace() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .json_body_partial(r#"{"stream": true}"#);
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(sse_body(&[
                        r#"{"choices":[{"delta":{"content":"Hello"}}]}"#,
                        r#"{"choices":[{"delta":{"content":" "}}]}"#,
                        r#"{"choices":[{"delta":{"content":"world"}}]}"#,
                        r#"{"choices":[{"delta":{"content":""}}]}"#,
                        "[DONE]",
                    ]));
            })
            .await;

        let client = ChatClient::new(server.base_url()).unwrap();
        let request = ChatRequest::new("m", "s", "u");
        let mut stream = client.complete_stream(KEY, request).await.unwrap();

        let mut events = Vec::new();
        while let Some(event) = stream.next_event().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                ChatStreamEvent::Content("Hello".to_string()),
                ChatStreamEvent::Content(" ".to_string()),
                ChatStreamEvent::Content("world".to_string()),
                ChatStreamEvent::Content(String::new()),
                ChatStreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_skips_malformed_and_absent_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(sse_body(&[
                        r#"{"choices":[{"delta":{"content":"a"}}]}"#,
                        "{not json at all",
                        r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
                        r#"{"choices":[{"delta":{"content":"b"}}]}"#,
                        "[DONE]",
                    ]));
            })
            .await;

        let client = ChatClient::new(server.base_url()).unwrap();
        let request = ChatRequest::new("m", "s", "u");
        let mut stream = client.complete_stream(KEY, request).await.unwrap();

        let mut events = Vec::new();
        while let Some(event) = stream.next_event().await {
            events.push(event);
        }

        assert_eq!(
            events,
            vec![
                ChatStreamEvent::Content("a".to_string()),
                ChatStreamEvent::Content("b".to_string()),
                ChatStreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_done_is_terminal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(sse_body(&[
                        r#"{"choices":[{"delta":{"content":"before"}}]}"#,
                        "[DONE]",
                        r#"{"choices":[{"delta":{"content":"after"}}]}"#,
                    ]));
            })
            .await;

        let client = ChatClient::new(server.base_url()).unwrap();
        let request = ChatRequest::new("m", "s", "u");
        let mut stream = client.complete_stream(KEY, request).await.unwrap();

        let mut events = Vec::new();
        while let Some(event) = stream.next_event().await {
            events.push(event);
        }

        let done_count = events
            .iter()
            .filter(|e| matches!(e, ChatStreamEvent::Done))
            .count();
        assert_eq!(done_count, 1);
        assert_eq!(events.last(), Some(&ChatStreamEvent::Done));
        assert!(!events.contains(&ChatStreamEvent::Content("after".to_string())));
    }

    #[tokio::test]
    async fn test_stream_upstream_error_surfaces_before_events() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(500).body("boom");
            })
            .await;

        let client = ChatClient::new(server.base_url()).unwrap();
        let request = ChatRequest::new("m", "s", "u");
        let err = client.complete_stream(KEY, request).await.unwrap_err();
        assert!(matches!(err, ChatError::Upstream { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_stream_eof_without_sentinel_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(sse_body(&[r#"{"choices":[{"delta":{"content":"x"}}]}"#]));
            })
            .await;

        let client = ChatClient::new(server.base_url()).unwrap();
        let request = ChatRequest::new("m", "s", "u");
        let mut stream = client.complete_stream(KEY, request).await.unwrap();

        assert_eq!(
            stream.next_event().await,
            Some(ChatStreamEvent::Content("x".to_string()))
        );
        assert!(matches!(
            stream.next_event().await,
            Some(ChatStreamEvent::Error(_))
        ));
        assert_eq!(stream.next_event().await, None);
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(sse_body(&[
                        r#"{"choices":[{"delta":{"content":"a"}}]}"#,
                        "[DONE]",
                    ]));
            })
            .await;

        let client = ChatClient::new(server.base_url()).unwrap();
        let request = ChatRequest::new("m", "s", "u");
        let mut stream = client.complete_stream(KEY, request).await.unwrap();

        stream.cancel();
        stream.cancel(); // idempotent

        // After cancellation the channel drains to None without hanging.
        while let Some(_event) = stream.next_event().await {}
    }
}
