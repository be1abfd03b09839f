//! OpenAI-compatible chat client.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use futures::StreamExt;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::chat::{ChatError, ChatModel};
use crate::sse::{parse_sse_line, SseEvent};

/// Configuration for the OpenAI-compatible chat client.
#[derive(Debug, Clone)]
pub struct OpenAiChatConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum retries for non-streaming calls
    pub max_retries: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token budget
    pub max_tokens: u32,
}

impl OpenAiChatConfig {
    /// Create config for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            temperature: 0.8,
            max_tokens: 512,
        }
    }

    /// Override the base URL (custom or self-hosted endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// OpenAI-compatible chat model implementation.
pub struct OpenAiChat {
    client: Client,
    config: OpenAiChatConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiChat {
    /// Create a new chat client.
    pub fn new(config: OpenAiChatConfig) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn build_request<'a>(&'a self, system: &'a str, prompt: &'a str, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: system,
                },
                ChatRequestMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream,
        }
    }

    /// Make a single non-streaming request.
    async fn make_request(&self, system: &str, prompt: &str) -> Result<String, ChatError> {
        let request = self.build_request(system, prompt, false);

        let response = self
            .client
            .post(self.completions_url())
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Api(e.to_string()))?;

        if response.status() == 429 {
            return Err(ChatError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = format!("HTTP {}: {}", status, body);
            return Err(if status.is_client_error() {
                ChatError::InvalidRequest(message)
            } else {
                ChatError::Api(message)
            });
        }

        let response_body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Parse(e.to_string()))?;

        response_body
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ChatError::Parse("No choices in response".to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    /// Blocking completion with retry. Only transport failures and rate
    /// limits are retried; rejected requests and malformed replies fail
    /// immediately.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ChatError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(120)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Calling chat completion API");

            match self.make_request(system, prompt).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !matches!(e, ChatError::Api(_) | ChatError::RateLimitExceeded) {
                        return Err(e);
                    }

                    if attempts >= self.config.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Chat call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    /// Streaming completion. Not retried: once tokens have been forwarded a
    /// replay would duplicate output.
    async fn complete_stream(
        &self,
        system: &str,
        prompt: &str,
        tx: mpsc::Sender<String>,
    ) -> Result<String, ChatError> {
        let request = self.build_request(system, prompt, true);

        let response = self
            .client
            .post(self.completions_url())
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Api(e.to_string()))?;

        if response.status() == 429 {
            return Err(ChatError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = format!("HTTP {}: {}", status, body);
            return Err(if status.is_client_error() {
                ChatError::InvalidRequest(message)
            } else {
                ChatError::Api(message)
            });
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut accumulated = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ChatError::Api(e.to_string()))?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // Process complete lines
            while let Some(line_end) = buffer.find('\n') {
                let line = buffer[..line_end].to_string();
                buffer = buffer[line_end + 1..].to_string();

                match parse_sse_line(&line) {
                    SseEvent::Delta(delta) => {
                        if delta.is_empty() {
                            continue;
                        }
                        accumulated.push_str(&delta);
                        if tx.send(delta).await.is_err() {
                            debug!("Stream consumer dropped, stopping");
                            return Err(ChatError::Cancelled);
                        }
                    }
                    SseEvent::Done => return Ok(accumulated),
                    SseEvent::Ignore => {}
                }
            }
        }

        Ok(accumulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server_uri: &str) -> OpenAiChat {
        let mut config = OpenAiChatConfig::openai("test-key", "gpt-4o-mini")
            .with_base_url(format!("{}/v1", server_uri));
        config.max_retries = 1;
        OpenAiChat::new(config).unwrap()
    }

    #[test]
    fn test_openai_config() {
        let config = OpenAiChatConfig::openai("test-key", "gpt-4o-mini");
        assert!(config.base_url.contains("openai"));
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_complete_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "a quiet day"}}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.complete("system", "prompt").await.unwrap();
        assert_eq!(reply, "a quiet day");
    }

    #[tokio::test]
    async fn test_complete_propagates_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete("system", "prompt").await.unwrap_err();
        assert!(matches!(err, ChatError::Api(_)));
    }

    #[tokio::test]
    async fn test_complete_retries_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "recovered"}}]
            })))
            .mount(&server)
            .await;

        let mut config = OpenAiChatConfig::openai("test-key", "gpt-4o-mini")
            .with_base_url(format!("{}/v1", server.uri()));
        config.max_retries = 3;
        let client = OpenAiChat::new(config).unwrap();

        let reply = client.complete("system", "prompt").await.unwrap();
        assert_eq!(reply, "recovered");
    }

    #[tokio::test]
    async fn test_complete_does_not_retry_malformed_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = OpenAiChatConfig::openai("test-key", "gpt-4o-mini")
            .with_base_url(format!("{}/v1", server.uri()));
        config.max_retries = 3;
        let client = OpenAiChat::new(config).unwrap();

        let err = client.complete("system", "prompt").await.unwrap_err();
        assert!(matches!(err, ChatError::Parse(_)));
    }

    #[tokio::test]
    async fn test_complete_does_not_retry_rejected_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = OpenAiChatConfig::openai("test-key", "gpt-4o-mini")
            .with_base_url(format!("{}/v1", server.uri()));
        config.max_retries = 3;
        let client = OpenAiChat::new(config).unwrap();

        let err = client.complete("system", "prompt").await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_complete_stream_forwards_deltas() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let (tx, mut rx) = mpsc::channel(16);
        let full = client.complete_stream("system", "prompt", tx).await.unwrap();

        assert_eq!(full, "Hello world");
        let mut tokens = Vec::new();
        while let Some(t) = rx.recv().await {
            tokens.push(t);
        }
        assert_eq!(tokens, vec!["Hello".to_string(), " world".to_string()]);
    }
}
