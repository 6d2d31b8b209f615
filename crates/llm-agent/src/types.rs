use serde::{Deserialize, Serialize};

use crate::Result;

/// Token accounting reported by a provider, when available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// One completed model invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Raw response text, exactly as the provider returned it.
    pub content: String,
    /// Model identifier, for logging.
    pub model: String,
    /// Usage metadata; `None` when the provider does not report it.
    pub usage: Option<TokenUsage>,
}

/// The capability the agents depend on: one prompt in, one completion out.
///
/// Implementations are synchronous and blocking; callers that need to run
/// inside an async runtime wrap invocations in `spawn_blocking`. The trait
/// is object-safe so chains hold a `Box<dyn ModelClient>` and tests swap in
/// scripted doubles.
pub trait ModelClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<Completion>;

    /// Model identifier for logging and trace metadata.
    fn model_name(&self) -> &str;
}
