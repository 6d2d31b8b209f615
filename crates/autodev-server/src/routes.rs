use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use autodev_core::config::Config;
use autodev_core::github::GitHubClient;
use autodev_core::trace::LogTracer;
use autodev_core::{run_code_agent, CiConclusion, ReviewerAgent, Verdict};

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /code
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub issue: u64,
    pub repo: String,
    #[serde(default = "default_max_iters")]
    pub max_iters: u32,
}

fn default_max_iters() -> u32 {
    5
}

#[derive(Debug, Serialize)]
pub struct CodeResponse {
    pub success: bool,
    pub branch: String,
    pub pr_number: Option<u64>,
    pub message: String,
}

/// Run the code agent for an issue. Run failures come back as
/// `success: false` in the body; only a missing workspace is an HTTP error.
pub async fn code(
    State(app): State<AppState>,
    Json(req): Json<CodeRequest>,
) -> Result<Json<CodeResponse>, AppError> {
    let Some(workspace) = app.workspace.clone() else {
        return Err(AppError::bad_request(
            "workspace not configured: set GITHUB_WORKSPACE or pass --workspace",
        ));
    };
    if !workspace.exists() {
        return Err(AppError::bad_request(format!(
            "workspace path does not exist: {}",
            workspace.display()
        )));
    }

    let result = tokio::task::spawn_blocking(move || {
        run_code_agent(workspace, &req.repo, req.issue, req.max_iters)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    let response = match result {
        Ok(r) => CodeResponse {
            success: r.success,
            branch: r.branch,
            pr_number: r.pr_number,
            message: r.message,
        },
        Err(e) => CodeResponse {
            success: false,
            branch: String::new(),
            pr_number: None,
            message: e.to_string(),
        },
    };
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// POST /review
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub pr: u64,
    pub repo: String,
    #[serde(default = "default_ci_conclusion")]
    pub ci_conclusion: String,
    #[serde(default)]
    pub ci_summary: String,
}

fn default_ci_conclusion() -> String {
    "success".to_string()
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub verdict: Verdict,
    pub reason: String,
    pub summary: String,
}

/// Run the reviewer agent for a change request and publish the verdict.
pub async fn review(
    State(_app): State<AppState>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, AppError> {
    let output = tokio::task::spawn_blocking(move || {
        let config = Config::from_env();
        let gh = GitHubClient::new(None, None)?;
        let model = llm_agent::from_env(config.llm_provider.as_deref())?;
        let reviewer = ReviewerAgent::new(&req.repo, GitHubClient::new(None, None)?, model);

        // The PR doubles as the issue reference when reviewing standalone.
        let pull = gh.get_pull(&req.repo, req.pr)?;
        let ci = CiConclusion::parse(&req.ci_conclusion);
        let (output, _job_summary) = reviewer.run_and_publish(
            req.pr,
            &pull.title,
            &pull.body,
            ci,
            &req.ci_summary,
            true,
            true,
            &LogTracer,
        )?;
        Ok::<_, autodev_core::AutodevError>(output)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(ReviewResponse {
        verdict: output.verdict,
        reason: output.reason,
        summary: output.summary,
    }))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
