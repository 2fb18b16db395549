//! LLM client for OpenAI-compatible chat-completions endpoints
//!
//! The assistant only uses the model to compress a matched answer, so the
//! surface is small: a streamed chat call and the [`Summarizer`] seam the
//! chat pipeline depends on.

pub mod prompts;
pub mod streaming;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use tracing::info;

pub use prompts::AssistantPrompts;
pub use prompts::PromptTemplate;
pub use prompts::SYSTEM_MESSAGE;
pub use streaming::decode_sse;
pub use streaming::parse_sse_line;
pub use streaming::SseEvent;
pub use streaming::StreamingResponse;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::ScrubMateError;

/// One message of a chat-completions request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// Compresses a matched answer into a reply for the user's question
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, context_answer: &str, user_query: &str) -> Result<StreamingResponse>;
}

/// Messages sent to the model for one summarization
pub fn summary_messages(context_answer: &str, user_query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(AssistantPrompts::summarize_instruction(context_answer)),
        ChatMessage::user(user_query),
    ]
}

/// Chat-completions client
#[derive(Clone)]
pub struct LlmService {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl LlmService {
    /// Create a service from configuration
    ///
    /// # Errors
    /// - Missing API key (`[llm].llm_key` or `PERPLEXITY_API_KEY`)
    /// - HTTP client construction failure
    pub fn new(config: &AppConfig) -> Result<Self> {
        if config.llm_key().trim().is_empty() {
            return Err(ScrubMateError::ConfigError(format!(
                "LLM key is not set; configure [llm].llm_key or {}",
                crate::config::LLM_KEY_ENV
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.llm_endpoint().trim_end_matches('/').to_string(),
            api_key: config.llm_key().to_string(),
            model: config.llm_model().to_string(),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    /// Send a streamed chat request; chunks arrive as they are generated
    pub async fn chat_stream(&self, messages: &[ChatMessage]) -> Result<StreamingResponse> {
        let request = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": true,
        });

        let url = self.chat_url();
        debug!("POST {} (model {}, {} messages)", url, self.model, messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScrubMateError::LlmError(format!("Request to {url} timed out"))
                } else if e.is_connect() {
                    ScrubMateError::LlmError(format!("Failed to connect to {url}: {e}"))
                } else {
                    ScrubMateError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(300).collect();
            return Err(ScrubMateError::LlmError(format!(
                "API error (HTTP {status}): {preview}"
            )));
        }

        Ok(StreamingResponse::new(decode_sse(response.bytes_stream())))
    }
}

#[async_trait]
impl Summarizer for LlmService {
    async fn summarize(&self, context_answer: &str, user_query: &str) -> Result<StreamingResponse> {
        info!("Summarizing matched answer with {}", self.model);
        self.chat_stream(&summary_messages(context_answer, user_query))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_key() {
        let mut config = AppConfig::default();
        config.llm.llm_key = String::new();
        assert!(matches!(
            LlmService::new(&config),
            Err(ScrubMateError::ConfigError(_))
        ));
    }

    #[test]
    fn test_chat_url_trims_trailing_slash() {
        let mut config = AppConfig::default();
        config.llm.llm_key = "test-key".to_string();
        config.llm.llm_endpoint = "https://api.perplexity.ai/".to_string();
        let service = LlmService::new(&config).unwrap();
        assert_eq!(service.chat_url(), "https://api.perplexity.ai/chat/completions");
        assert_eq!(service.model(), "sonar-pro");
    }

    #[test]
    fn test_summary_messages() {
        let messages = summary_messages("1. Foley", "TUC 세팅");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.ends_with("정보: 1. Foley"));
        assert_eq!(messages[1], ChatMessage::user("TUC 세팅"));
    }
}
