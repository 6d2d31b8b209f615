//! Reviewer agent chain: change request + diff + CI → structured verdict.
//!
//! Independent from the code agent: separate prompt, separate policy. The
//! verdict is parsed fail-closed and the review event is derived from it,
//! never supplied by a caller.

use llm_agent::ModelClient;
use tracing::info;

use crate::error::Result;
use crate::github::GitHubClient;
use crate::pr::CiConclusion;
use crate::prompts;
use crate::review::ReviewOutput;
use crate::trace::Tracer;

/// The verdict prompt includes at most this many characters of diff.
const DIFF_EXCERPT_LIMIT: usize = 8000;

pub struct ReviewerAgent {
    repo: String,
    gh: GitHubClient,
    model: Box<dyn ModelClient>,
}

impl ReviewerAgent {
    pub fn new(repo: impl Into<String>, gh: GitHubClient, model: Box<dyn ModelClient>) -> Self {
        Self {
            repo: repo.into(),
            gh,
            model,
        }
    }

    /// Fetch the PR context, run the verdict prompt, and return structured
    /// output without publishing anything.
    pub fn run(
        &self,
        pr_number: u64,
        issue_title: &str,
        issue_body: &str,
        ci_conclusion: CiConclusion,
        ci_summary: &str,
        tracer: &dyn Tracer,
    ) -> Result<ReviewOutput> {
        let pr = self
            .gh
            .pr_context(&self.repo, pr_number, ci_conclusion, ci_summary)?;
        let excerpt: String = pr.diff.chars().take(DIFF_EXCERPT_LIMIT).collect();

        tracer.span("verdict", &[("model", self.model.model_name())]);
        let response = self
            .model
            .complete(&prompts::verdict_prompt(&pr, issue_title, issue_body, &excerpt))?;

        let output =
            ReviewOutput::from_model_output(&response.content, ci_conclusion, &pr.changed_files);
        info!(pr = pr_number, verdict = %output.verdict, "review complete");
        Ok(output)
    }

    /// Run the review and publish: a summary comment and a structured
    /// review on the change request. Returns the output plus a job-summary
    /// markdown block for CI logs.
    #[allow(clippy::too_many_arguments)]
    pub fn run_and_publish(
        &self,
        pr_number: u64,
        issue_title: &str,
        issue_body: &str,
        ci_conclusion: CiConclusion,
        ci_summary: &str,
        post_comment: bool,
        post_review: bool,
        tracer: &dyn Tracer,
    ) -> Result<(ReviewOutput, String)> {
        let output = self.run(
            pr_number,
            issue_title,
            issue_body,
            ci_conclusion,
            ci_summary,
            tracer,
        )?;

        let job_summary = format!(
            "## Reviewer Agent\n\n**Verdict:** {}\n**Reason:** {}\n**CI:** {}",
            output.verdict, output.reason, ci_conclusion
        );

        if post_comment {
            self.gh
                .create_comment(&self.repo, pr_number, &output.summary)?;
        }
        if post_review {
            self.gh.create_review(
                &self.repo,
                pr_number,
                output.event,
                &output.summary,
                &output.inline_comments,
            )?;
        }
        Ok((output, job_summary))
    }
}
