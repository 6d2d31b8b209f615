//! Structured review result: verdict, rationale, inline comments, event.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parse;
use crate::pr::CiConclusion;

/// Inline comments are capped to keep reviews readable; source order wins.
pub const MAX_INLINE_COMMENTS: usize = 10;

// ---------------------------------------------------------------------------
// Verdict / ReviewEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        })
    }
}

/// Review event posted to the tracker. Derived from the verdict and never
/// accepted from a caller, so a Fail verdict can never approve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewEvent {
    Approve,
    RequestChanges,
}

impl From<Verdict> for ReviewEvent {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Pass => Self::Approve,
            Verdict::Fail => Self::RequestChanges,
        }
    }
}

impl ReviewEvent {
    /// String the tracker review API expects.
    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::RequestChanges => "REQUEST_CHANGES",
        }
    }
}

// ---------------------------------------------------------------------------
// InlineComment / ReviewOutput
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineComment {
    pub path: String,
    /// 1-based line number in the changed file.
    pub line: u32,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutput {
    pub verdict: Verdict,
    pub reason: String,
    /// Human-readable summary for the change-request comment.
    pub summary: String,
    pub inline_comments: Vec<InlineComment>,
    pub event: ReviewEvent,
}

impl ReviewOutput {
    /// Build a review from raw model output.
    ///
    /// Comments whose path is not in `changed_files` are dropped (the model
    /// may hallucinate paths it never touched) and the list is capped at
    /// [`MAX_INLINE_COMMENTS`], preserving source order.
    pub fn from_model_output(
        text: &str,
        ci_conclusion: CiConclusion,
        changed_files: &[String],
    ) -> Self {
        let raw = parse::parse_review(text);
        let inline_comments: Vec<InlineComment> = raw
            .comments
            .into_iter()
            .filter(|c| changed_files.iter().any(|f| f == &c.path))
            .take(MAX_INLINE_COMMENTS)
            .collect();

        let summary = format!(
            "**Verdict: {}**\n\nReason: {}\n\nCI: {}",
            raw.verdict, raw.reason, ci_conclusion
        );

        Self {
            verdict: raw.verdict,
            reason: raw.reason,
            summary,
            inline_comments,
            event: ReviewEvent::from(raw.verdict),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(files: &[&str]) -> Vec<String> {
        files.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn pass_verdict_approves() {
        let text = "VERDICT: PASS\nREASON: Looks good\n";
        let out = ReviewOutput::from_model_output(text, CiConclusion::Success, &changed(&["a.rs"]));
        assert_eq!(out.verdict, Verdict::Pass);
        assert_eq!(out.event, ReviewEvent::Approve);
        assert!(out.summary.contains("**Verdict: Pass**"));
        assert!(out.summary.contains("Looks good"));
        assert!(out.summary.contains("CI: success"));
    }

    #[test]
    fn fail_verdict_requests_changes() {
        let text = "VERDICT: FAIL\nREASON: Tests failing\n";
        let out = ReviewOutput::from_model_output(text, CiConclusion::Failure, &changed(&["a.rs"]));
        assert_eq!(out.verdict, Verdict::Fail);
        assert_eq!(out.event, ReviewEvent::RequestChanges);
    }

    #[test]
    fn absent_marker_fails_closed() {
        let out = ReviewOutput::from_model_output("no verdict here", CiConclusion::Unknown, &[]);
        assert_eq!(out.verdict, Verdict::Fail);
        assert_eq!(out.event, ReviewEvent::RequestChanges);
    }

    #[test]
    fn hallucinated_paths_are_dropped() {
        let text = "VERDICT: FAIL\nREASON: issues\nCOMMENTS:\nFILE:real.rs:1 fix this\nFILE:fake.rs:2 and this\n";
        let out = ReviewOutput::from_model_output(text, CiConclusion::Unknown, &changed(&["real.rs"]));
        assert_eq!(out.inline_comments.len(), 1);
        assert_eq!(out.inline_comments[0].path, "real.rs");
    }

    #[test]
    fn comments_capped_at_ten_in_order() {
        let mut text = String::from("VERDICT: FAIL\nREASON: many\nCOMMENTS:\n");
        for i in 0..15 {
            text.push_str(&format!("FILE:a.rs:{} comment {}\n", i + 1, i + 1));
        }
        let out = ReviewOutput::from_model_output(&text, CiConclusion::Unknown, &changed(&["a.rs"]));
        assert_eq!(out.inline_comments.len(), MAX_INLINE_COMMENTS);
        assert_eq!(out.inline_comments[0].line, 1);
        assert_eq!(out.inline_comments[9].line, 10);
    }

    #[test]
    fn event_string_matches_tracker_api() {
        assert_eq!(ReviewEvent::Approve.as_api_str(), "APPROVE");
        assert_eq!(ReviewEvent::RequestChanges.as_api_str(), "REQUEST_CHANGES");
    }
}
