//! OpenAI-compatible provider implementation for chat
//!
//! This module implements the Provider trait against the chat completions
//! endpoint of an OpenAI-compatible API. Requests are single-shot: no
//! streaming, no retries.

use crate::config::GatewayConfig;
use crate::error::{ChatError, Result};
use crate::providers::{CompletionRequest, Message, Provider};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI chat completions provider
///
/// # Examples
///
/// ```no_run
/// use chat::config::GatewayConfig;
/// use chat::providers::{CompletionRequest, Message, OpenAiProvider, Provider};
///
/// # async fn example() -> chat::error::Result<()> {
/// let provider = OpenAiProvider::new(GatewayConfig::from_env())?;
/// let request = CompletionRequest {
///     model: "gpt-4o".to_string(),
///     temperature: 1.0,
///     messages: vec![Message::system("Be brief."), Message::user("Hello!")],
/// };
/// let reply = provider.complete(&request).await?;
/// # Ok(())
/// # }
/// ```
pub struct OpenAiProvider {
    client: Client,
    config: GatewayConfig,
}

/// Request body for /chat/completions
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: &'a [Message],
}

/// Response body from /chat/completions
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn format_api_error(status: StatusCode, body: &str) -> ChatError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChatError::Authentication(format!(
            "API returned error {}: {}. Check OPENAI_API_KEY",
            status, body
        )),
        StatusCode::TOO_MANY_REQUESTS => {
            ChatError::RateLimited(format!("API returned error {}: {}", status, body))
        }
        _ => ChatError::Provider(format!("API returned error {}: {}", status, body)),
    }
}

impl OpenAiProvider {
    /// Create a new provider instance
    ///
    /// A missing API key is not an error here; it is reported when a
    /// completion is first requested.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use chat::config::GatewayConfig;
    /// use chat::providers::OpenAiProvider;
    ///
    /// let provider = OpenAiProvider::new(GatewayConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("chat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!("Initialized OpenAI provider: api_base={}", config.api_base);

        Ok(Self { client, config })
    }

    /// The configured API base
    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ChatError::MissingCredentials("OPENAI_API_KEY is not set".to_string()))?;

        let body = ChatCompletionRequest {
            model: &request.model,
            temperature: request.temperature,
            messages: &request.messages,
        };

        tracing::debug!(
            "Sending completion request: model={}, {} messages",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Completion request failed: {}", e);
                ChatError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("API returned error {}: {}", status, error_text);
            return Err(format_api_error(status, &error_text).into());
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse completion response: {}", e);
            ChatError::MalformedResponse(format!("Failed to parse completion response: {}", e))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::MalformedResponse("response has no choices".to_string()))?;

        let content = choice.message.content.ok_or_else(|| {
            ChatError::MalformedResponse("first choice has no content".to_string())
        })?;

        Ok(content)
    }
}
