//! Version-control mutation controller.
//!
//! A thin wrapper over `git` subprocess calls with the recovery rules the
//! automation needs: deterministic branch naming, one-shot collision
//! recovery on branch creation, staging of accepted paths only, and a push
//! with bounded transient retry plus a single force-with-lease fallback on
//! rejection.
//!
//! Subprocess execution sits behind [`GitRunner`] so the retry logic is
//! testable without a remote.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{AutodevError, Result};

const PUSH_ATTEMPTS: u32 = 3;
const DEFAULT_PUSH_BACKOFF: Duration = Duration::from_secs(5);
const SLUG_MAX_LEN: usize = 30;

/// Substrings in git stderr that indicate a transient server-side failure.
const TRANSIENT_MARKERS: &[&str] = &[
    "rpc failed",
    "http 500",
    "internal server error",
    "hung up",
];

// ---------------------------------------------------------------------------
// Branch naming
// ---------------------------------------------------------------------------

/// Deterministic branch name for an issue: `agent/issue-<id>-<slug>`.
///
/// Identical issue id and title always yield the identical branch name.
pub fn branch_name(issue_number: u64, title: &str) -> String {
    format!("agent/issue-{}-{}", issue_number, slug(title))
}

/// Branch-safe slug: strip non-word/space/hyphen characters, collapse
/// whitespace runs to a single hyphen, lowercase, truncate. Empty results
/// fall back to `issue`.
fn slug(title: &str) -> String {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    static COLLAPSE: OnceLock<Regex> = OnceLock::new();
    let strip = STRIP.get_or_init(|| Regex::new(r"[^\w\s-]").expect("static regex"));
    let collapse = COLLAPSE.get_or_init(|| Regex::new(r"[-\s]+").expect("static regex"));

    let stripped = strip.replace_all(title, "");
    let collapsed = collapse.replace_all(&stripped, "-");
    let trimmed = collapsed.trim_matches('-').to_lowercase();
    let truncated: String = trimmed.chars().take(SLUG_MAX_LEN).collect();
    if truncated.is_empty() {
        "issue".to_string()
    } else {
        truncated
    }
}

// ---------------------------------------------------------------------------
// GitRunner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Executes one git invocation. The production implementation shells out;
/// tests substitute scripted fakes to drive the retry paths.
pub trait GitRunner {
    fn run(&self, workdir: &Path, args: &[&str]) -> Result<CommandOutput>;
}

/// Runs the real `git` binary in the working directory.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl GitRunner for SystemRunner {
    fn run(&self, workdir: &Path, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new("git")
            .current_dir(workdir)
            .args(args)
            .output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

/// One working tree, one mutation sequence per run. Concurrent use of the
/// same working tree is unsafe; callers serialize runs per checkout.
pub struct Git<R: GitRunner = SystemRunner> {
    workdir: PathBuf,
    runner: R,
    push_backoff: Duration,
}

impl Git<SystemRunner> {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self::with_runner(workdir, SystemRunner)
    }
}

impl<R: GitRunner> Git<R> {
    pub fn with_runner(workdir: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            workdir: workdir.into(),
            runner,
            push_backoff: DEFAULT_PUSH_BACKOFF,
        }
    }

    /// Override the base delay between transient push retries (test seam).
    pub fn with_push_backoff(mut self, backoff: Duration) -> Self {
        self.push_backoff = backoff;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run(&self.workdir, args)
    }

    /// Run a git command, mapping a non-zero exit to [`AutodevError::Git`].
    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(AutodevError::Git {
                command: args.join(" "),
                detail: output.stderr.trim().to_string(),
            })
        }
    }

    pub fn current_branch(&self) -> Result<String> {
        let out = self.run_checked(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    pub fn checkout(&self, reference: &str) -> Result<()> {
        self.run_checked(&["checkout", reference]).map(|_| ())
    }

    /// Create and checkout a branch at the current head.
    pub fn create_branch(&self, name: &str) -> Result<()> {
        debug!(branch = name, "creating branch");
        self.run_checked(&["checkout", "-b", name]).map(|_| ())
    }

    /// Create a branch, recovering once from a stale branch left by a prior
    /// aborted run: checkout the trunk, force-delete the stale branch
    /// (best-effort), and retry creation exactly once.
    pub fn create_branch_with_recovery(&self, name: &str, trunk: &str) -> Result<()> {
        match self.create_branch(name) {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!(branch = name, error = %first, "branch creation failed; recovering");
                self.checkout(trunk)?;
                if let Err(e) = self.run_checked(&["branch", "-D", name]) {
                    debug!(branch = name, error = %e, "stale branch deletion failed");
                }
                self.create_branch(name).map_err(|second| {
                    AutodevError::BranchCreation {
                        branch: name.to_string(),
                        detail: second.to_string(),
                    }
                })
            }
        }
    }

    /// Stage exactly the given paths. Never stages the whole tree, so
    /// unrelated working-tree noise cannot leak into an automated commit.
    pub fn add(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args: Vec<&str> = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_checked(&args).map(|_| ())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run_checked(&["commit", "-m", message]).map(|_| ())
    }

    /// Push `branch` to the remote (or an explicit push URL), with up to
    /// three attempts.
    ///
    /// Transient server-side failures back off linearly and retry; a
    /// rejection (remote diverged) is resolved by a single force-with-lease
    /// push whose failure propagates as [`AutodevError::PushRejected`]; any
    /// other error propagates immediately. Exhausting the budget yields
    /// [`AutodevError::PushExhausted`].
    pub fn push(&self, branch: &str, push_url: Option<&str>) -> Result<()> {
        let target = push_url.unwrap_or("origin");
        let mut last_detail = String::new();

        for attempt in 0..PUSH_ATTEMPTS {
            match self.run_checked(&["push", target, branch]) {
                Ok(_) => return Ok(()),
                Err(AutodevError::Git { command, detail }) => {
                    let lower = detail.to_lowercase();
                    if TRANSIENT_MARKERS.iter().any(|m| lower.contains(m)) {
                        warn!(attempt, detail = %detail, "transient push failure; backing off");
                        last_detail = detail;
                        std::thread::sleep(self.push_backoff * (attempt + 1));
                        continue;
                    }
                    if lower.contains("rejected") {
                        debug!(branch, "push rejected; attempting force-with-lease");
                        return self
                            .run_checked(&["push", "--force-with-lease", target, branch])
                            .map(|_| ())
                            .map_err(|e| AutodevError::PushRejected(e.to_string()));
                    }
                    return Err(AutodevError::Git { command, detail });
                }
                Err(other) => return Err(other),
            }
        }

        Err(AutodevError::PushExhausted {
            attempts: PUSH_ATTEMPTS,
            detail: last_detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // --- branch naming ---

    #[test]
    fn branch_name_is_deterministic() {
        let a = branch_name(42, "Add greeting function!");
        let b = branch_name(42, "Add greeting function!");
        assert_eq!(a, b);
        assert_eq!(a, "agent/issue-42-add-greeting-function");
    }

    #[test]
    fn slug_is_bounded_and_branch_safe() {
        let name = branch_name(1, "A very long title that should definitely be truncated somewhere");
        let slug_part = name.strip_prefix("agent/issue-1-").unwrap();
        assert!(slug_part.chars().count() <= SLUG_MAX_LEN);
        assert!(slug_part
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'));
    }

    #[test]
    fn empty_title_falls_back() {
        assert_eq!(branch_name(7, "!!!"), "agent/issue-7-issue");
        assert_eq!(branch_name(7, ""), "agent/issue-7-issue");
    }

    #[test]
    fn whitespace_runs_collapse_to_one_hyphen() {
        assert_eq!(branch_name(3, "fix   the -- bug"), "agent/issue-3-fix-the-bug");
    }

    // --- real repository operations ---

    fn init_repo() -> (TempDir, Git) {
        let dir = TempDir::new().unwrap();
        let git = Git::new(dir.path());
        git.run_checked(&["init"]).unwrap();
        git.run_checked(&["config", "user.email", "agent@example.com"])
            .unwrap();
        git.run_checked(&["config", "user.name", "agent"]).unwrap();
        fs::write(dir.path().join("README.md"), "seed\n").unwrap();
        git.add(&["README.md".to_string()]).unwrap();
        git.commit("initial commit").unwrap();
        git.run_checked(&["branch", "-M", "main"]).unwrap();
        (dir, git)
    }

    #[test]
    fn create_branch_and_checkout() {
        let (_dir, git) = init_repo();
        git.create_branch("agent/issue-1-test").unwrap();
        assert_eq!(git.current_branch().unwrap(), "agent/issue-1-test");
    }

    #[test]
    fn stale_branch_is_recovered_once() {
        let (_dir, git) = init_repo();
        git.create_branch("agent/issue-1-test").unwrap();
        git.checkout("main").unwrap();
        // Same branch again: plain creation fails, recovery deletes and
        // recreates it.
        git.create_branch_with_recovery("agent/issue-1-test", "main")
            .unwrap();
        assert_eq!(git.current_branch().unwrap(), "agent/issue-1-test");
    }

    #[test]
    fn add_stages_only_given_paths() {
        let (dir, git) = init_repo();
        fs::write(dir.path().join("staged.txt"), "yes\n").unwrap();
        fs::write(dir.path().join("noise.txt"), "no\n").unwrap();
        git.add(&["staged.txt".to_string()]).unwrap();
        git.commit("add staged file").unwrap();

        let status = git.run_checked(&["status", "--porcelain"]).unwrap();
        assert!(status.contains("?? noise.txt"));
        assert!(!status.contains("staged.txt"));
    }

    #[test]
    fn push_to_local_bare_remote() {
        let (_dir, git) = init_repo();
        let remote = TempDir::new().unwrap();
        Git::new(remote.path()).run_checked(&["init", "--bare"]).unwrap();
        git.run_checked(&["remote", "add", "origin", &remote.path().to_string_lossy()])
            .unwrap();

        git.create_branch("agent/issue-9-push").unwrap();
        git.push("agent/issue-9-push", None).unwrap();

        let refs = Git::new(remote.path())
            .run_checked(&["branch", "--list"])
            .unwrap();
        assert!(refs.contains("agent/issue-9-push"));
    }

    // --- scripted push retry paths ---

    struct FakeRunner {
        script: Mutex<VecDeque<CommandOutput>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl FakeRunner {
        fn new(script: Vec<CommandOutput>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GitRunner for &FakeRunner {
        fn run(&self, _workdir: &Path, args: &[&str]) -> Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|a| a.to_string()).collect());
            Ok(self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted"))
        }
    }

    fn ok() -> CommandOutput {
        CommandOutput {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn fail(stderr: &str) -> CommandOutput {
        CommandOutput {
            success: false,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn transient_failures_retry_then_succeed() {
        let runner = FakeRunner::new(vec![
            fail("error: RPC failed; curl 55"),
            fail("fatal: the remote end hung up unexpectedly"),
            ok(),
        ]);
        let git = Git::with_runner("/unused", &runner).with_push_backoff(Duration::ZERO);
        git.push("agent/issue-1-x", None).unwrap();
        assert_eq!(runner.calls().len(), 3);
    }

    #[test]
    fn transient_exhaustion_is_terminal() {
        let runner = FakeRunner::new(vec![
            fail("error: RPC failed"),
            fail("error: RPC failed"),
            fail("error: RPC failed"),
        ]);
        let git = Git::with_runner("/unused", &runner).with_push_backoff(Duration::ZERO);
        let err = git.push("agent/issue-1-x", None).unwrap_err();
        assert!(matches!(err, AutodevError::PushExhausted { attempts: 3, .. }));
        assert_eq!(runner.calls().len(), 3);
    }

    #[test]
    fn rejection_triggers_exactly_one_force_with_lease() {
        let runner = FakeRunner::new(vec![
            fail("! [rejected] agent/issue-1-x -> agent/issue-1-x (fetch first)"),
            ok(),
        ]);
        let git = Git::with_runner("/unused", &runner).with_push_backoff(Duration::ZERO);
        git.push("agent/issue-1-x", None).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1][1], "--force-with-lease");
    }

    #[test]
    fn failed_force_with_lease_propagates() {
        let runner = FakeRunner::new(vec![
            fail("! [rejected] (fetch first)"),
            fail("! [rejected] stale info"),
        ]);
        let git = Git::with_runner("/unused", &runner).with_push_backoff(Duration::ZERO);
        let err = git.push("agent/issue-1-x", None).unwrap_err();
        assert!(matches!(err, AutodevError::PushRejected(_)));
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn other_push_errors_propagate_immediately() {
        let runner = FakeRunner::new(vec![fail("fatal: repository not found")]);
        let git = Git::with_runner("/unused", &runner).with_push_backoff(Duration::ZERO);
        let err = git.push("agent/issue-1-x", None).unwrap_err();
        assert!(matches!(err, AutodevError::Git { .. }));
        assert_eq!(runner.calls().len(), 1);
    }
}
