//! OpenAI chat-completions adapter. Default model: `gpt-4o-mini`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Completion, ModelClient, TokenUsage};
use crate::{ModelError, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
        })
    }

    /// Build from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ModelError::MissingCredentials("OPENAI_API_KEY not set".to_string()))?;
        Self::new(key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the API base URL (test seam).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ModelClient for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<Completion> {
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "openai completion request");
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                detail: response.text().unwrap_or_default(),
            });
        }

        let body: ChatResponse = response.json()?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ModelError::EmptyCompletion)?;

        Ok(Completion {
            content,
            model: self.model.clone(),
            usage: body.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_against_mock_server() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "PLAN: do it"}}],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 4}
                })
                .to_string(),
            )
            .create();

        let client = OpenAiClient::new("test-key")
            .unwrap()
            .with_base_url(server.url());
        let completion = client.complete("hello").unwrap();

        mock.assert();
        assert_eq!(completion.content, "PLAN: do it");
        assert_eq!(completion.model, "gpt-4o-mini");
        assert_eq!(
            completion.usage,
            Some(TokenUsage {
                prompt_tokens: 12,
                completion_tokens: 4
            })
        );
    }

    #[test]
    fn api_error_carries_status() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("bad key")
            .create();

        let client = OpenAiClient::new("wrong")
            .unwrap()
            .with_base_url(server.url());
        let err = client.complete("hello").unwrap_err();
        assert!(matches!(err, ModelError::Api { status: 401, .. }));
    }

    #[test]
    fn empty_choices_is_an_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create();

        let client = OpenAiClient::new("test-key")
            .unwrap()
            .with_base_url(server.url());
        let err = client.complete("hello").unwrap_err();
        assert!(matches!(err, ModelError::EmptyCompletion));
    }
}
