//! Environment-derived configuration with explicit-argument override.
//!
//! All settings are optional at load time; each consumer demands what it
//! needs (`repo_or`, `token`) so error messages name the missing variable.

use std::path::PathBuf;

use crate::error::{AutodevError, Result};

pub const REPO_ENV: &str = "GITHUB_REPOSITORY";
pub const WORKSPACE_ENV: &str = "GITHUB_WORKSPACE";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Repository full name (`owner/name`).
    pub repo: Option<String>,
    /// Path to the working tree the agent mutates.
    pub workspace: Option<PathBuf>,
    /// Tracker API token.
    pub token: Option<String>,
    /// Model provider selection (`openai` / `yandex`).
    pub llm_provider: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            repo: std::env::var(REPO_ENV).ok().filter(|s| !s.is_empty()),
            workspace: std::env::var(WORKSPACE_ENV)
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            token: std::env::var(TOKEN_ENV).ok().filter(|s| !s.is_empty()),
            llm_provider: std::env::var(llm_agent::PROVIDER_ENV).ok(),
        }
    }

    /// Resolve the repository full name: explicit argument wins, then env.
    pub fn repo_or(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.repo.clone())
            .ok_or_else(|| {
                AutodevError::Config(format!(
                    "repository not set: pass --repo owner/name or set {REPO_ENV}"
                ))
            })
    }

    /// Resolve the working-tree path: explicit argument, then env, then `.`.
    pub fn workspace_or(&self, explicit: Option<&str>) -> PathBuf {
        explicit
            .map(PathBuf::from)
            .or_else(|| self.workspace.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_repo_wins() {
        let config = Config {
            repo: Some("env/repo".to_string()),
            ..Config::default()
        };
        assert_eq!(config.repo_or(Some("cli/repo")).unwrap(), "cli/repo");
        assert_eq!(config.repo_or(None).unwrap(), "env/repo");
    }

    #[test]
    fn missing_repo_is_a_config_error() {
        let config = Config::default();
        let err = config.repo_or(None).unwrap_err();
        assert!(matches!(err, AutodevError::Config(_)));
    }

    #[test]
    fn workspace_defaults_to_cwd() {
        let config = Config::default();
        assert_eq!(config.workspace_or(None), PathBuf::from("."));
        assert_eq!(config.workspace_or(Some("/tmp/wt")), PathBuf::from("/tmp/wt"));
    }
}
