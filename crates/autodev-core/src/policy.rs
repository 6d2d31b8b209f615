//! Iteration stop-condition policy: deterministic, no infinite loops.

use serde::{Deserialize, Serialize};

/// Reason the automation loop stopped (or declined to stop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// CI green and reviewer approved.
    Success,
    MaxIterations,
    ReviewerApprove,
    ReviewerFail,
    CiFail,
    Manual,
}

/// Gatekeeping configuration for the fix loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationPolicy {
    pub max_iterations: u32,
    pub require_ci_green: bool,
    pub require_reviewer_approve: bool,
}

impl Default for IterationPolicy {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            require_ci_green: true,
            require_reviewer_approve: true,
        }
    }
}

impl IterationPolicy {
    pub fn with_max_iterations(max_iterations: u32) -> Self {
        Self {
            max_iterations,
            ..Self::default()
        }
    }

    /// Decide whether the loop should stop. First match wins; `iteration`
    /// is zero-based and compared with `>=` so a policy with
    /// `max_iterations = N` never permits more than N evaluated iterations.
    pub fn should_stop(
        &self,
        iteration: u32,
        ci_passed: bool,
        reviewer_approved: bool,
    ) -> (bool, StopReason) {
        if iteration >= self.max_iterations {
            return (true, StopReason::MaxIterations);
        }
        if self.require_ci_green && !ci_passed {
            return (false, StopReason::CiFail);
        }
        if self.require_reviewer_approve && !reviewer_approved {
            return (false, StopReason::ReviewerFail);
        }
        if ci_passed && reviewer_approved {
            return (true, StopReason::Success);
        }
        // Reachable only when both requirements are disabled and the review
        // is still unapproved; keep retrying.
        (false, StopReason::ReviewerFail)
    }

    /// Whether another generation cycle may be launched.
    pub fn can_retry(&self, iteration: u32) -> bool {
        iteration < self.max_iterations
    }
}
