//! OpenAI-compatible chat-completions provider
//!
//! Sends the conversation to a hosted chat-completions endpoint and collects
//! the streamed chunks into one reply. Callers never see partial output.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use super::traits::{CompletionError, CompletionProvider};
use crate::domain::models::ChatMessage;

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Provider backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// One SSE chunk of a streamed completion.
#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn wire_messages<'a>(&self, history: &'a [ChatMessage]) -> Vec<WireMessage<'a>> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        });
        for msg in history {
            messages.push(WireMessage {
                role: if msg.is_user_message { "user" } else { "assistant" },
                content: &msg.text,
            });
        }
        messages
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: self.wire_messages(history),
            stream: true,
        };

        tracing::debug!(
            model = %self.model,
            message_count = request.messages.len(),
            "Requesting completion"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Completion request rejected");
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // Accumulate the SSE stream into the full reply text.
        let mut stream = response.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        let mut reply = String::new();

        'receive: while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buf.extend_from_slice(&chunk);

            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                let Some(data) = line.trim().strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();
                if data == "[DONE]" {
                    break 'receive;
                }

                let parsed: StreamChunk = serde_json::from_str(data)?;
                for choice in parsed.choices {
                    if let Some(text) = choice.delta.content {
                        reply.push_str(&text);
                    }
                }
            }
        }

        if reply.is_empty() {
            return Err(CompletionError::EmptyCompletion);
        }

        tracing::debug!(reply_len = reply.len(), "Completion accumulated");
        Ok(reply)
    }
}
