use anyhow::{bail, Context};
use autodev_core::config::Config;
use autodev_core::run_code_agent;

pub fn run(
    repo: Option<&str>,
    issue: u64,
    max_iters: u32,
    cwd: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let config = Config::from_env();
    let repo = config.repo_or(repo)?;
    let path = config
        .workspace_or(cwd)
        .canonicalize()
        .context("workspace path does not exist")?;

    println!("Running code agent for issue #{issue} in {repo} at {}", path.display());
    let result = run_code_agent(&path, &repo, issue, max_iters)
        .with_context(|| format!("code agent failed for issue #{issue}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.success {
        println!(
            "Success: PR #{} created on branch {}",
            result.pr_number.unwrap_or_default(),
            result.branch
        );
    }

    if !result.success {
        bail!("{}", result.message);
    }
    Ok(())
}
