use crate::config::Config;
use crate::error::GenerationError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body of an OpenAI-compatible chat completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Text-in/text-out generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url,
            timeout,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            Duration::from_secs(config.openai_timeout_secs),
            client,
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct RespChoiceMsg {
    content: Option<String>,
}

#[derive(Deserialize)]
struct RespChoice {
    message: RespChoiceMsg,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<RespChoice>,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerationError> {
        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Completion request failed");
                GenerationError::Api(e.to_string())
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            tracing::error!(%status, "Completion API returned an error");
            return Err(GenerationError::Api(format!(
                "OpenAI API Error {}: {}",
                status, text
            )));
        }

        let body: Resp = res
            .json()
            .await
            .map_err(|e| GenerationError::Api(format!("Invalid completion envelope: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::Api("Completion contained no message content".into()))
    }
}
