//! YandexGPT adapter (foundationModels completion endpoint).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Completion, ModelClient};
use crate::{ModelError, Result};

const DEFAULT_BASE_URL: &str = "https://llm.api.cloud.yandex.net";
const DEFAULT_MODEL: &str = "yandexgpt/latest";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct YandexClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    folder_id: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl YandexClient {
    pub fn new(api_key: impl Into<String>, folder_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            folder_id: folder_id.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Build from `YANDEX_API_KEY` and `YANDEX_FOLDER_ID`.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("YANDEX_API_KEY").map_err(|_| {
            ModelError::MissingCredentials("YANDEX_API_KEY not set".to_string())
        })?;
        let folder = std::env::var("YANDEX_FOLDER_ID").map_err(|_| {
            ModelError::MissingCredentials("YANDEX_FOLDER_ID not set".to_string())
        })?;
        Self::new(key, folder)
    }

    /// Override the API base URL (test seam).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.folder_id, self.model)
    }
}

impl ModelClient for YandexClient {
    fn complete(&self, prompt: &str) -> Result<Completion> {
        let request = CompletionRequest {
            model_uri: self.model_uri(),
            completion_options: CompletionOptions {
                temperature: self.temperature,
                // The API expects maxTokens as a string.
                max_tokens: self.max_tokens.to_string(),
                stream: false,
            },
            messages: vec![YandexMessage {
                role: "user",
                text: prompt,
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "yandex completion request");
        let response = self
            .http
            .post(format!(
                "{}/foundationModels/v1/completion",
                self.base_url
            ))
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::Api {
                status: status.as_u16(),
                detail: response.text().unwrap_or_default(),
            });
        }

        let body: CompletionResponse = response.json()?;
        let content: String = body
            .result
            .alternatives
            .iter()
            .map(|a| a.message.text.as_str())
            .collect();

        Ok(Completion {
            content,
            model: self.model.clone(),
            usage: None,
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
#[serde(rename_all = "camelCase")]
struct CompletionRequest<'a> {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: Vec<YandexMessage<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    temperature: f32,
    max_tokens: String,
    stream: bool,
}

#[derive(Serialize)]
struct YandexMessage<'a> {
    role: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Deserialize)]
struct CompletionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    message: AlternativeMessage,
}

#[derive(Deserialize)]
struct AlternativeMessage {
    text: String,
}
