//! `autodev-core` — the orchestration layer that turns free-form model text
//! into bounded repository mutations and review decisions.
//!
//! The dangerous surface is small and lives here: parsing untrusted model
//! output into structured intents (`parse`), restricting every write target
//! to a pre-computed allowed-path set (`patch`), the git mutation sequence
//! with its collision and push recovery (`git`), the loop stop-condition
//! policy (`policy`), and the review verdict model (`review`). Everything
//! else (model invocation, tracker API, CLI/HTTP surfaces) is a collaborator
//! behind a narrow interface.
//!
//! All code in this crate is synchronous and blocking, and assumes exclusive
//! ownership of one working tree per run. Callers that need concurrency
//! serialize runs per checkout.

pub mod coder;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod issue;
pub mod parse;
pub mod patch;
pub mod policy;
pub mod pr;
pub mod prompts;
pub mod review;
pub mod reviewer;
pub mod trace;

pub use coder::{run_code_agent, CodeAgent, CodeAgentResult};
pub use error::{AutodevError, Result};
pub use issue::IssueContext;
pub use policy::{IterationPolicy, StopReason};
pub use pr::{CiConclusion, PrContext};
pub use review::{InlineComment, ReviewEvent, ReviewOutput, Verdict};
pub use reviewer::ReviewerAgent;
