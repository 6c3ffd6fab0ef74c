//! Hosted text-completion client
//!
//! Chat-completions call against the Hugging Face inference router. Any
//! transport, auth, or model failure surfaces as
//! [`CompletionError::Api`] and aborts the run from whichever stage
//! invoked it.

use aro_core::{AroConfig, CompletionError, TextCompletion};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
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
    content: Option<String>,
}

/// Completion client over the hosted inference API
#[derive(Clone)]
pub struct HfCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    token: String,
    max_tokens: u32,
    temperature: f32,
}

// Manual impl: the bearer token must never reach log output
impl std::fmt::Debug for HfCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("token", &"<redacted>")
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl HfCompletionClient {
    /// Create a client from pipeline configuration
    #[must_use]
    pub fn new(config: &AroConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.api_endpoint.clone(),
            model: config.model.clone(),
            token: config.api_token.clone(),
            max_tokens: 4096,
            temperature: 0.5,
        }
    }

    /// With sampling temperature
    #[inline]
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait::async_trait]
impl TextCompletion for HfCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!(
                "completion endpoint returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Api(format!("unparseable completion response: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_decodes_choice_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("hello")
        );
    }

    #[test]
    fn client_builds_from_config() {
        let config = AroConfig::new("secret").with_model("test-model");
        let client = HfCompletionClient::new(&config).with_temperature(0.1);
        assert_eq!(client.model, "test-model");
        assert_eq!(client.temperature, 0.1);
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let config = AroConfig::new("hf_super_secret_token");
        let rendered = format!("{:?}", HfCompletionClient::new(&config));
        assert!(!rendered.contains("hf_super_secret_token"));
        assert!(rendered.contains("<redacted>"));
    }
}
