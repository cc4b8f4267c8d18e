use async_trait::async_trait;
use domain::entities::message::ChatMessage;
use domain::services::{ChatModel, ChunkStream};
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use shared::error::{Error, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// One NDJSON line of a streamed `/api/chat` response.
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Arc<Client>,
    base_url: String,
    model: String,
    token: Option<String>,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, token: Option<String>) -> Result<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_nodelay(true)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<ChunkStream> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: true,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(url = %url, model = %self.model, "Sending chat request");
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Model(format!("Ollama API error ({}): {}", status, text)));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| Error::Network(format!("response stream failed: {}", e)))
            })
            .boxed();

        Ok(content_chunks(body))
    }
}

struct NdjsonState {
    body: BoxStream<'static, Result<Vec<u8>>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String>>,
    finished: bool,
}

impl NdjsonState {
    fn drain_lines(&mut self) {
        while !self.finished {
            let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.push_line(&line);
        }
    }

    fn push_line(&mut self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        match serde_json::from_str::<ChatResponse>(line) {
            Ok(response) => {
                if let Some(error) = response.error {
                    self.pending.push_back(Err(Error::Model(error)));
                    self.finished = true;
                    return;
                }
                if let Some(message) = response.message {
                    if !message.content.is_empty() {
                        self.pending.push_back(Ok(message.content));
                    }
                }
                if response.done {
                    self.finished = true;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Skipping unparsable stream line"),
        }
    }
}

/// Turns a streamed NDJSON body into message-content chunks, stopping at
/// the first `done: true` line.
pub fn content_chunks(body: BoxStream<'static, Result<Vec<u8>>>) -> ChunkStream {
    let state = NdjsonState {
        body,
        buffer: Vec::with_capacity(4096),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(bytes)) => {
                    state.buffer.extend_from_slice(&bytes);
                    state.drain_lines();
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    let rest = std::mem::take(&mut state.buffer);
                    state.push_line(&rest);
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}
