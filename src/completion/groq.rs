use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{CompletionClient, CompletionError, CompletionRequest};
use crate::config::CompletionConfig;

/// Groq (or any OpenAI-compatible chat-completions endpoint) client
pub struct GroqClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

impl GroqClient {
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::Configuration(
                    "API key required (set GROQ_API_KEY or completion.api_key)".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key,
            client,
        })
    }

    /// Turn a non-success HTTP status into a typed error
    fn status_error(status: StatusCode, retry_after: Option<u64>, body: String) -> CompletionError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            CompletionError::RateLimited {
                message: body,
                retry_after,
            }
        } else {
            CompletionError::Api {
                status: status.as_u16(),
                message: body,
            }
        }
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = %request.model, "Sending request to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, retry_after, text));
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(tokens = usage.total_tokens, "Completion finished");
        }

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let config = CompletionConfig {
            api_key: None,
            ..CompletionConfig::default()
        };
        assert!(matches!(
            GroqClient::new(&config),
            Err(CompletionError::Configuration(_))
        ));

        let blank = CompletionConfig {
            api_key: Some("   ".to_string()),
            ..CompletionConfig::default()
        };
        assert!(GroqClient::new(&blank).is_err());
    }

    #[test]
    fn test_status_error_mapping() {
        let limited =
            GroqClient::status_error(StatusCode::TOO_MANY_REQUESTS, Some(7), "slow".into());
        assert!(matches!(
            limited,
            CompletionError::RateLimited { retry_after: Some(7), .. }
        ));

        let server = GroqClient::status_error(StatusCode::BAD_GATEWAY, None, "oops".into());
        assert!(matches!(server, CompletionError::Api { status: 502, .. }));
        assert!(!server.is_rate_limited());
    }

    #[test]
    fn test_response_deserialization_tolerates_missing_usage() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"TITLE: x"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();

        assert!(parsed.usage.is_none());
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("TITLE: x"));
    }
}
