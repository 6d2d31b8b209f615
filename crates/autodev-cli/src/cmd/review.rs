use std::io::Write;

use anyhow::Context;
use autodev_core::config::Config;
use autodev_core::github::GitHubClient;
use autodev_core::trace::LogTracer;
use autodev_core::{CiConclusion, ReviewerAgent};

pub fn run(
    repo: Option<&str>,
    pr: u64,
    ci_conclusion: &str,
    ci_summary: &str,
    no_publish: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::from_env();
    let repo = config.repo_or(repo)?;
    println!("Running reviewer agent for PR #{pr} in {repo}");

    let gh = GitHubClient::new(None, None)?;
    let pull = gh
        .get_pull(&repo, pr)
        .with_context(|| format!("failed to fetch PR #{pr}"))?;
    let model = llm_agent::from_env(config.llm_provider.as_deref())?;
    let reviewer = ReviewerAgent::new(&repo, GitHubClient::new(None, None)?, model);
    let ci = CiConclusion::parse(ci_conclusion);

    if no_publish {
        let output = reviewer.run(pr, &pull.title, &pull.body, ci, ci_summary, &LogTracer)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", output.summary);
        }
        return Ok(());
    }

    let (output, job_summary) = reviewer.run_and_publish(
        pr,
        &pull.title,
        &pull.body,
        ci,
        ci_summary,
        true,
        true,
        &LogTracer,
    )?;

    println!("{job_summary}");

    // In CI, append the markdown block to the step summary file.
    if let Ok(step_summary_path) = std::env::var("GITHUB_STEP_SUMMARY") {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&step_summary_path)
            .with_context(|| format!("cannot open step summary: {step_summary_path}"))?;
        writeln!(file, "\n{job_summary}")?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Verdict: {}", output.verdict);
    }
    Ok(())
}
