use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CiConclusion
// ---------------------------------------------------------------------------

/// Tri-state continuous-integration outcome supplied externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiConclusion {
    Success,
    Failure,
    Unknown,
}

impl CiConclusion {
    /// Parse a free-text CI conclusion; anything unrecognized maps to
    /// `Unknown` rather than an error.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "success" | "passed" | "pass" => Self::Success,
            "failure" | "failed" | "fail" => Self::Failure,
            _ => Self::Unknown,
        }
    }

    pub fn passed(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for CiConclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// PrContext
// ---------------------------------------------------------------------------

/// Snapshot of a change request, built once per review run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrContext {
    pub number: u64,
    pub title: String,
    pub body: String,
    /// Unified diff text, possibly a placeholder when the diff fetch failed.
    pub diff: String,
    /// Changed file paths, in the order the tracker reports them.
    pub changed_files: Vec<String>,
    pub base_ref: String,
    pub head_ref: String,
    pub ci_conclusion: CiConclusion,
    pub ci_summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ci_conclusion_parses_loosely() {
        assert_eq!(CiConclusion::parse("success"), CiConclusion::Success);
        assert_eq!(CiConclusion::parse("  FAILED "), CiConclusion::Failure);
        assert_eq!(CiConclusion::parse("cancelled"), CiConclusion::Unknown);
        assert_eq!(CiConclusion::parse(""), CiConclusion::Unknown);
    }

    #[test]
    fn only_success_counts_as_passed() {
        assert!(CiConclusion::Success.passed());
        assert!(!CiConclusion::Failure.passed());
        assert!(!CiConclusion::Unknown.passed());
    }
}
