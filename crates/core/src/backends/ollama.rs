use crate::traits::ChatBackend;
use crate::{ChatError, ChatMessage};
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const STATUS_TIMEOUT: Duration = Duration::from_secs(5);
const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct StreamLine {
    #[serde(default)]
    message: Option<StreamMessage>,
}

#[derive(Debug, Deserialize)]
struct StreamMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Network chunks may end mid-line or mid-character, so bytes are buffered
/// until a newline arrives. Blank and non-JSON lines are skipped.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    pending: Vec<u8>,
    text: String,
    skipped: usize,
}

impl StreamAccumulator {
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line = self.pending.drain(..=newline).collect::<Vec<_>>();
            self.consume_line(&line);
        }
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    pub fn finish(mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        self.consume_line(&rest);
        self.text.trim().to_string()
    }

    fn consume_line(&mut self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        match serde_json::from_str::<StreamLine>(line) {
            Ok(parsed) => {
                if let Some(message) = parsed.message {
                    self.text.push_str(&message.content);
                }
            }
            Err(_) => self.skipped += 1,
        }
    }
}

pub struct OllamaClient {
    base: Url,
    client: Client,
}

impl OllamaClient {
    pub fn new(host: &str) -> Result<Self, ChatError> {
        let mut base = Url::parse(host.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            base,
            client: Client::new(),
        })
    }

    pub fn host(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ChatError> {
        Ok(self.base.join(path)?)
    }

    async fn fetch_tags(&self) -> Result<TagsResponse, ChatError> {
        let response = self
            .client
            .get(self.endpoint("api/tags")?)
            .timeout(STATUS_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::BackendResponse {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn is_available(&self) -> bool {
        match self.fetch_tags().await {
            Ok(_) => true,
            Err(error) => {
                debug!(host = %self.base, %error, "ollama server unavailable");
                false
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, ChatError> {
        Ok(self
            .fetch_tags()
            .await?
            .models
            .into_iter()
            .map(|tag| tag.name)
            .collect())
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ChatError> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage::user(prompt)],
            stream: true,
        };

        debug!(model, prompt_chars = prompt.len(), "sending chat request");

        let response = self
            .client
            .post(self.endpoint("api/chat")?)
            .timeout(CHAT_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::BackendResponse {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let mut accumulator = StreamAccumulator::default();
        let mut stream = response.bytes_stream();
        while let Some(bytes) = stream.try_next().await? {
            accumulator.push(&bytes);
        }

        if accumulator.skipped_lines() > 0 {
            warn!(
                skipped = accumulator.skipped_lines(),
                "ignored malformed lines in chat stream"
            );
        }

        let text = accumulator.finish();
        if text.is_empty() {
            return Err(ChatError::EmptyResponse);
        }

        Ok(text)
    }
}
