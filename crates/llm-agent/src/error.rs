use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    #[error("unknown model provider: {0}")]
    UnknownProvider(String),

    #[error("model API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("model returned an empty completion")]
    EmptyCompletion,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
