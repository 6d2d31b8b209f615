//! GitHub REST client: issues, pull requests, comments, reviews.
//!
//! Blocking client with a small retry budget for rate limiting; all other
//! API errors propagate unchanged. The base URL is injectable so tests run
//! against a local mock server.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config;
use crate::error::{AutodevError, Result};
use crate::issue::IssueContext;
use crate::pr::{CiConclusion, PrContext};
use crate::review::{InlineComment, ReviewEvent};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const RATE_LIMIT_ATTEMPTS: u32 = 3;
const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Validate a base URL override; empty input falls back to the default.
fn ensure_http_url(url: Option<&str>) -> Result<String> {
    let url = url.unwrap_or("").trim();
    if url.is_empty() {
        return Ok(DEFAULT_BASE_URL.to_string());
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(AutodevError::Config(format!(
            "invalid API base URL (missing scheme): {url}"
        )))
    }
}

/// Pull-request header data, before diff and changed files are attached.
#[derive(Debug, Clone)]
pub struct PullDetails {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub base_ref: String,
    pub head_ref: String,
}

pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: String,
    rate_limit_cooldown: Duration,
}

impl GitHubClient {
    /// Build a client; the token comes from the argument or `GITHUB_TOKEN`.
    pub fn new(token: Option<String>, base_url: Option<&str>) -> Result<Self> {
        let token = token
            .or_else(|| std::env::var(config::TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AutodevError::Config(format!("{} environment variable is required", config::TOKEN_ENV))
            })?;
        Ok(Self {
            http: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            base_url: ensure_http_url(base_url)?,
            token,
            rate_limit_cooldown: DEFAULT_RATE_LIMIT_COOLDOWN,
        })
    }

    /// Shrink the rate-limit cooldown (test seam).
    pub fn with_rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }

    /// API token, used by the git controller to build a token push URL.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Send a request, retrying on rate limiting with a fixed cooldown.
    /// Other non-success statuses map to [`AutodevError::Api`].
    fn request(
        &self,
        method: Method,
        path: &str,
        accept: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        for attempt in 0..RATE_LIMIT_ATTEMPTS {
            let mut req = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&self.token)
                .header("Accept", accept)
                .header("User-Agent", "autodev");
            if let Some(json) = body {
                req = req.json(json);
            }
            let response = req.send()?;
            let status = response.status().as_u16();

            if status == 429 || status == 403 {
                let text = response.text().unwrap_or_default();
                if status == 429 || text.to_lowercase().contains("rate limit") {
                    warn!(attempt, status, "tracker rate limit; cooling down");
                    std::thread::sleep(self.rate_limit_cooldown);
                    continue;
                }
                return Err(AutodevError::Api {
                    status,
                    detail: text,
                });
            }
            if !(200..300).contains(&status) {
                return Err(AutodevError::Api {
                    status,
                    detail: response.text().unwrap_or_default(),
                });
            }
            debug!(%url, status, "tracker request ok");
            return Ok(response);
        }
        Err(AutodevError::RateLimited(RATE_LIMIT_ATTEMPTS))
    }

    fn get(&self, path: &str, accept: &str) -> Result<Response> {
        self.request(Method::GET, path, accept, None)
    }

    fn post(&self, path: &str, body: serde_json::Value) -> Result<Response> {
        self.request(Method::POST, path, "application/vnd.github+json", Some(&body))
    }

    // -- issues ------------------------------------------------------------

    pub fn get_issue(&self, repo: &str, number: u64) -> Result<IssueContext> {
        let response = self.get(
            &format!("/repos/{repo}/issues/{number}"),
            "application/vnd.github+json",
        )?;
        let wire: IssueResponse = response.json()?;
        Ok(IssueContext {
            number: wire.number,
            title: wire.title.unwrap_or_default(),
            body: wire.body.unwrap_or_default(),
            labels: wire.labels.into_iter().map(|l| l.name).collect(),
            state: wire.state.unwrap_or_else(|| "open".to_string()),
        })
    }

    pub fn create_comment(&self, repo: &str, number: u64, body: &str) -> Result<()> {
        self.post(
            &format!("/repos/{repo}/issues/{number}/comments"),
            serde_json::json!({ "body": body }),
        )?;
        Ok(())
    }

    // -- pull requests -----------------------------------------------------

    pub fn get_pull(&self, repo: &str, number: u64) -> Result<PullDetails> {
        let response = self.get(
            &format!("/repos/{repo}/pulls/{number}"),
            "application/vnd.github+json",
        )?;
        let wire: PullResponse = response.json()?;
        Ok(PullDetails {
            number: wire.number,
            title: wire.title.unwrap_or_default(),
            body: wire.body.unwrap_or_default(),
            base_ref: wire.base.r#ref,
            head_ref: wire.head.r#ref,
        })
    }

    pub fn get_pull_diff(&self, repo: &str, number: u64) -> Result<String> {
        let response = self.get(
            &format!("/repos/{repo}/pulls/{number}"),
            "application/vnd.github.diff",
        )?;
        Ok(response.text()?)
    }

    pub fn list_pull_files(&self, repo: &str, number: u64) -> Result<Vec<String>> {
        let response = self.get(
            &format!("/repos/{repo}/pulls/{number}/files"),
            "application/vnd.github+json",
        )?;
        let wire: Vec<PullFileResponse> = response.json()?;
        Ok(wire.into_iter().map(|f| f.filename).collect())
    }

    /// Assemble the full review context for one pull request. A failed diff
    /// fetch degrades to a placeholder instead of aborting the review.
    pub fn pr_context(
        &self,
        repo: &str,
        number: u64,
        ci_conclusion: CiConclusion,
        ci_summary: &str,
    ) -> Result<PrContext> {
        let details = self.get_pull(repo, number)?;
        let diff = match self.get_pull_diff(repo, number) {
            Ok(diff) => diff,
            Err(e) => {
                warn!(number, error = %e, "diff fetch failed; reviewing without diff");
                "(diff unavailable)".to_string()
            }
        };
        let changed_files = self.list_pull_files(repo, number)?;
        Ok(PrContext {
            number: details.number,
            title: details.title,
            body: details.body,
            diff,
            changed_files,
            base_ref: details.base_ref,
            head_ref: details.head_ref,
            ci_conclusion,
            ci_summary: ci_summary.to_string(),
        })
    }

    pub fn create_pull(
        &self,
        repo: &str,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<u64> {
        let response = self.post(
            &format!("/repos/{repo}/pulls"),
            serde_json::json!({
                "title": title,
                "body": body,
                "head": head,
                "base": base,
            }),
        )?;
        let wire: PullResponse = response.json()?;
        Ok(wire.number)
    }

    pub fn create_review(
        &self,
        repo: &str,
        number: u64,
        event: ReviewEvent,
        body: &str,
        comments: &[InlineComment],
    ) -> Result<()> {
        let comments: Vec<serde_json::Value> = comments
            .iter()
            .map(|c| {
                serde_json::json!({
                    "path": c.path,
                    "line": c.line,
                    "body": c.body,
                })
            })
            .collect();
        self.post(
            &format!("/repos/{repo}/pulls/{number}/reviews"),
            serde_json::json!({
                "event": event.as_api_str(),
                "body": body,
                "comments": comments,
            }),
        )?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct IssueResponse {
    number: u64,
    title: Option<String>,
    body: Option<String>,
    #[serde(default)]
    labels: Vec<LabelResponse>,
    state: Option<String>,
}

#[derive(Deserialize)]
struct LabelResponse {
    name: String,
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    base: RefResponse,
    #[serde(default)]
    head: RefResponse,
}

#[derive(Deserialize, Default)]
struct RefResponse {
    #[serde(rename = "ref", default)]
    r#ref: String,
}

#[derive(Deserialize)]
struct PullFileResponse {
    filename: String,
}
