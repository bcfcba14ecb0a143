use async_trait::async_trait;
use lingua_core::{ChatRequest, LLMProvider, LLMResponse, Usage};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

use crate::error::ProviderError;
use crate::retry::retry_with_backoff;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completion client for OpenAI and API-compatible gateways.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    retry_delays: Vec<Duration>,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAiProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: lingua_core::Model::default().as_str().to_string(),
            retry_delays: vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ],
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_default_model(mut self, model: String) -> Self {
        self.default_model = model;
        self
    }

    /// Pauses between attempts; an empty list disables retries.
    #[must_use]
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    /// Abort a single attempt after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> anyhow::Result<Self> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn request_body(request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": request.messages,
        });
        if request.json_output {
            body["response_format"] = json!({ "type": "json_object" });
        }
        body
    }

    /// Helper method to send a single request
    async fn try_send(&self, body: &Value) -> Result<LLMResponse, ProviderError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let value = response.json::<Value>().await?;
        parse_response(&value)
    }
}

/// Read content and usage out of a chat-completion response.
///
/// A response without message content yields empty content; a response
/// without a `choices` array is malformed.
fn parse_response(value: &Value) -> Result<LLMResponse, ProviderError> {
    let choices = value["choices"]
        .as_array()
        .ok_or_else(|| ProviderError::Format("missing choices".to_string()))?;

    let content = choices
        .first()
        .and_then(|choice| choice["message"]["content"].as_str())
        .unwrap_or_default()
        .to_string();

    let usage = value["usage"].as_object().map(|u| Usage {
        prompt_tokens: u32::try_from(u["prompt_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
        completion_tokens: u32::try_from(u["completion_tokens"].as_u64().unwrap_or(0))
            .unwrap_or(0),
        total_tokens: u32::try_from(u["total_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    async fn chat(&self, request: &ChatRequest) -> anyhow::Result<LLMResponse> {
        let body = Self::request_body(request);

        info!("Sending request to completion API: model={}", request.model);

        let response = retry_with_backoff(
            || self.try_send(&body),
            &self.retry_delays,
            ProviderError::is_retryable,
        )
        .await?;

        info!("Received response from completion API");
        Ok(response)
    }

    fn get_default_model(&self) -> &str {
        &self.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_core::ChatMessage;

    #[test]
    fn test_request_body_asks_for_json_object() {
        let request = ChatRequest {
            model: "gpt-5-nano".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            json_output: true,
        };

        let body = OpenAiProvider::request_body(&request);

        assert_eq!(body["model"], "gpt-5-nano");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_request_body_without_json_flag() {
        let request = ChatRequest {
            model: "gpt-5".to_string(),
            messages: vec![ChatMessage::user("hi")],
            json_output: false,
        };

        assert!(OpenAiProvider::request_body(&request).get("response_format").is_none());
    }

    #[test]
    fn test_parse_response_reads_content_and_usage() {
        let value = json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"translation\":\"Hola\"}" } }],
            "usage": { "prompt_tokens": 30, "completion_tokens": 6, "total_tokens": 36 }
        });

        let response = parse_response(&value).unwrap();

        assert_eq!(response.content, "{\"translation\":\"Hola\"}");
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(36));
    }

    #[test]
    fn test_parse_response_tolerates_missing_content() {
        let value = json!({ "choices": [{ "message": { "role": "assistant", "content": null } }] });

        let response = parse_response(&value).unwrap();

        assert_eq!(response.content, "");
        assert!(response.usage.is_none());
    }

    #[test]
    fn test_parse_response_rejects_missing_choices() {
        let value = json!({ "error": "nope" });
        assert!(matches!(
            parse_response(&value),
            Err(ProviderError::Format(_))
        ));
    }
}
