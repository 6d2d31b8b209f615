//! Prompt builders for the coder and reviewer chains.
//!
//! The wording here is paired with the parsers in `parse`: the markers
//! (`PLAN:`, `FILES:`, `--- FILE:`, `VERDICT:`, ...) must stay in sync with
//! what `parse_plan`, `parse_patches`, and `parse_review` recognize.

use crate::issue::IssueContext;
use crate::pr::PrContext;

pub const CODER_SYSTEM: &str = "\
You are a Code Agent. You implement changes in a codebase based on issue descriptions.
Rules:
- Only modify or create files that exist in the provided file inventory. Do not invent paths.
- If the issue is ambiguous, make reasonable default assumptions and note them in the commit message.
- Output concrete, minimal edits. Prefer small focused commits.
- You must respond in the exact format requested (plan, file list, patch).";

pub const REVIEWER_SYSTEM: &str = "\
You are an independent Reviewer Agent. You review change requests strictly against:
1. The original issue (requirements)
2. The diff and changed files
3. CI results
You must NOT automatically approve. Output Pass only if the change fully satisfies the issue and CI is green.
Output Fail with clear reasons otherwise. Base your verdict only on issue + diff + CI.";

pub fn plan_prompt(issue: &IssueContext, inventory: &[String]) -> String {
    format!(
        "{system}\n\n## Issue\nTitle: {title}\nBody:\n{body}\n\n\
         ## File inventory (only these paths exist; do not reference others)\n{inventory}\n\n\
         ## Task\n\
         1. Propose a short step-by-step plan to address this issue.\n\
         2. List only files from the inventory that you will touch (one per line).\n\
         Output format:\n\
         PLAN:\n<your plan>\n\nFILES:\n<path1>\n<path2>\n",
        system = CODER_SYSTEM,
        title = issue.title,
        body = issue.body,
        inventory = inventory.join("\n"),
    )
}

pub fn patch_prompt(issue: &IssueContext, files: &[String], file_contents: &str) -> String {
    format!(
        "{system}\n\n## Issue\nTitle: {title}\nBody:\n{body}\n\n\
         ## Files to modify (must be from inventory)\n{files}\n\n\
         ## Current content of relevant files\n{contents}\n\n\
         ## Task\n\
         Generate the exact file changes. For each file, output:\n\
         --- FILE: <path>\n<full new content>\n--- END FILE\n\n\
         Do not output paths that are not in the file inventory.",
        system = CODER_SYSTEM,
        title = issue.title,
        body = issue.body,
        files = files.join("\n"),
        contents = if file_contents.is_empty() {
            "(new file)"
        } else {
            file_contents
        },
    )
}

pub fn verdict_prompt(
    pr: &PrContext,
    issue_title: &str,
    issue_body: &str,
    diff_excerpt: &str,
) -> String {
    format!(
        "{system}\n\n## Original issue\nTitle: {issue_title}\nBody:\n{issue_body}\n\n\
         ## Change request\nTitle: {pr_title}\nDescription:\n{pr_body}\n\n\
         ## Changed files\n{changed}\n\n## Diff (excerpt)\n{diff}\n\n\
         ## CI\nConclusion: {ci}\nSummary: {ci_summary}\n\n\
         ## Task\nOutput exactly:\n\
         VERDICT: Pass|Fail\n\
         REASON: <one line>\n\
         COMMENTS:\n\
         FILE:<path>:<line> <comment>\n",
        system = REVIEWER_SYSTEM,
        pr_title = pr.title,
        pr_body = pr.body,
        changed = pr.changed_files.join("\n"),
        diff = diff_excerpt,
        ci = pr.ci_conclusion,
        ci_summary = pr.ci_summary,
    )
}
