//! OpenAI-style chat-completions backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::GatewayError;
use crate::{GenerateOptions, LlmGateway};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model when the configuration names none.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Gateway backed by a chat-completions endpoint.
///
/// The request carries the system instruction and the user prompt as two
/// chat messages; the answer is read from `choices[0].message.content`.
#[derive(Debug, Clone)]
pub struct OpenAiGateway {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiGateway {
    /// Creates a gateway with the given credential, endpoint, model, and
    /// request timeout.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Unavailable` if the HTTP client cannot be
    /// constructed.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait::async_trait]
impl LlmGateway for OpenAiGateway {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerateOptions,
    ) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: system,
                },
                ChatRequestMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: options.max_output_tokens,
            temperature: options.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "openai", prompt = %user, error = %e, "request failed");
                if e.is_timeout() {
                    GatewayError::transport(format!("request timed out: {e}"))
                } else {
                    GatewayError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(provider = "openai", prompt = %user, error = %e, "failed to read response body");
            GatewayError::transport(format!("failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            error!(
                provider = "openai",
                status = status.as_u16(),
                prompt = %user,
                response = %body,
                "provider rejected generation request"
            );
            return Err(GatewayError::rejected(status.as_u16()));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            error!(provider = "openai", prompt = %user, response = %body, error = %e, "unparsable response body");
            GatewayError::malformed(e.to_string())
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                error!(provider = "openai", prompt = %user, response = %body, "response carried no generated text");
                GatewayError::malformed("response carried no generated text")
            })?;

        debug!(provider = "openai", prompt = %user, response = %text, "generation succeeded");
        Ok(text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo",
            messages: vec![
                ChatRequestMessage {
                    role: "system",
                    content: "You are a helpful educational assistant.",
                },
                ChatRequestMessage {
                    role: "user",
                    content: "What is photosynthesis?",
                },
            ],
            max_tokens: 500,
            temperature: 0.7,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["max_tokens"], 500);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Plants convert light."}}
            ]
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Plants convert light.");
    }

    #[test]
    fn test_empty_choices_is_malformed() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
