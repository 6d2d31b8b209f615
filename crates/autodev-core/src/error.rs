use thiserror::Error;

pub type Result<T> = std::result::Result<T, AutodevError>;

#[derive(Debug, Error)]
pub enum AutodevError {
    /// Model output contained no patch blocks inside the allowed-path set.
    /// Raised before any version-control mutation (fail closed).
    #[error("no valid patches generated; only paths from the file inventory are accepted")]
    EmptyPatch,

    /// Branch creation failed even after the delete-and-recreate recovery.
    #[error("branch creation failed for '{branch}': {detail}")]
    BranchCreation { branch: String, detail: String },

    /// Push still failed after the transient-retry budget was exhausted.
    #[error("push failed after {attempts} attempts: {detail}")]
    PushExhausted { attempts: u32, detail: String },

    /// The single force-with-lease recovery push was itself rejected.
    #[error("force-with-lease push failed: {0}")]
    PushRejected(String),

    #[error("git {command} failed: {detail}")]
    Git { command: String, detail: String },

    #[error("tracker API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("rate limited by tracker API after {0} attempts")]
    RateLimited(u32),

    #[error("missing configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Model(#[from] llm_agent::ModelError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
