//! `llm-agent` — generative-model adapters for the autodev workspace.
//!
//! The agents treat the model as a narrow capability: send one prompt, get
//! one text completion back. Everything behind that boundary (provider wire
//! formats, auth, endpoints) lives in this crate so the orchestration code
//! in `autodev-core` can be tested against deterministic doubles.
//!
//! ```text
//! prompt: &str
//!     │
//!     ▼
//! dyn ModelClient          ← OpenAiClient | YandexClient | test double
//!     │
//!     ▼
//! Completion { content, model, usage }
//! ```

pub mod error;
pub mod openai;
pub mod types;
pub mod yandex;

pub use error::ModelError;
pub use openai::OpenAiClient;
pub use types::{Completion, ModelClient, TokenUsage};
pub use yandex::YandexClient;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Environment variable selecting the model provider (`openai` or `yandex`).
pub const PROVIDER_ENV: &str = "AUTODEV_LLM_PROVIDER";

/// Build a model client from the environment.
///
/// `provider` overrides `AUTODEV_LLM_PROVIDER`; the default is `openai`.
/// Credentials come from the provider's own environment variables
/// (`OPENAI_API_KEY`, or `YANDEX_API_KEY` + `YANDEX_FOLDER_ID`).
pub fn from_env(provider: Option<&str>) -> Result<Box<dyn ModelClient>> {
    let provider = provider
        .map(str::to_string)
        .or_else(|| std::env::var(PROVIDER_ENV).ok())
        .unwrap_or_else(|| "openai".to_string())
        .to_lowercase();

    match provider.as_str() {
        "yandex" => Ok(Box::new(YandexClient::from_env()?)),
        "openai" => Ok(Box::new(OpenAiClient::from_env()?)),
        other => Err(ModelError::UnknownProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_rejected() {
        let err = from_env(Some("oracle")).err().unwrap();
        assert!(matches!(err, ModelError::UnknownProvider(p) if p == "oracle"));
    }
}
