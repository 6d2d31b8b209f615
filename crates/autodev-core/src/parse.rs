//! Parsers for the model-output text protocols.
//!
//! Three contracts, one rule: never error on malformed input. Untrusted text
//! degrades to empty/default structures and the caller decides what "nothing
//! usable" means. The line-oriented formats are parsed with explicit state
//! enums rather than boolean mode flags, and the patch blocks with a line
//! tokenizer rather than a backtracking regex.

use std::collections::{BTreeMap, BTreeSet};

use crate::review::{InlineComment, Verdict};

// ---------------------------------------------------------------------------
// Plan output: PLAN: / FILES:
// ---------------------------------------------------------------------------

/// Result of parsing a planning response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOutput {
    pub plan: String,
    /// Candidate paths, order preserved, comments and blanks dropped.
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanMode {
    Neutral,
    Plan,
    Files,
}

/// Extract the `PLAN:` text and `FILES:` list from a planning response.
///
/// A line starting (case-insensitively, after trimming) with `PLAN:` enters
/// plan mode and contributes its remainder; `FILES:` enters file mode and is
/// itself discarded. The two modes are mutually exclusive. In file mode every
/// non-empty line becomes a candidate path, except `#`-prefixed comments.
pub fn parse_plan(text: &str) -> PlanOutput {
    let mut plan_lines: Vec<String> = Vec::new();
    let mut files: Vec<String> = Vec::new();
    let mut mode = PlanMode::Neutral;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(rest) = strip_marker(trimmed, "PLAN:") {
            mode = PlanMode::Plan;
            plan_lines.push(rest.trim().to_string());
            continue;
        }
        if strip_marker(trimmed, "FILES:").is_some() {
            mode = PlanMode::Files;
            continue;
        }
        match mode {
            PlanMode::Plan => plan_lines.push(line.to_string()),
            PlanMode::Files => {
                if !trimmed.is_empty() && !trimmed.starts_with('#') {
                    files.push(trimmed.to_string());
                }
            }
            PlanMode::Neutral => {}
        }
    }

    PlanOutput {
        plan: plan_lines.join("\n").trim().to_string(),
        files,
    }
}

/// Case-insensitive marker match at the start of a line, returning the
/// remainder. Byte-safe: a line shorter than the marker, or one whose
/// prefix is not a char boundary, simply does not match.
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let prefix = line.get(..marker.len())?;
    if prefix.eq_ignore_ascii_case(marker) {
        Some(&line[marker.len()..])
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Patch blocks: --- FILE: <path> ... --- END FILE
// ---------------------------------------------------------------------------

/// Extract `--- FILE:` blocks, keeping only paths in the allowed set.
///
/// A block runs until the next `--- FILE:` marker, an explicit
/// `--- END FILE`, or end of input; content never spans past the next block
/// marker. Blocks whose trimmed path is not in `allowed` are silently
/// dropped, so the result's key set is always a subset of `allowed`.
pub fn parse_patches(text: &str, allowed: &BTreeSet<String>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(path) = block_start(trimmed) {
            flush_block(&mut out, current.take(), allowed);
            current = Some((path.to_string(), Vec::new()));
            continue;
        }
        if block_end(trimmed) {
            flush_block(&mut out, current.take(), allowed);
            continue;
        }
        if let Some((_, content)) = current.as_mut() {
            content.push(line);
        }
    }
    // End of input terminates an open block.
    flush_block(&mut out, current.take(), allowed);
    out
}

/// Match `--- FILE: <path>` (whitespace after `---` optional), returning the
/// trimmed path.
fn block_start(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("---")?.trim_start();
    rest.strip_prefix("FILE:").map(str::trim)
}

/// Match `--- END FILE`.
fn block_end(line: &str) -> bool {
    line.strip_prefix("---")
        .map(|rest| rest.trim_start().starts_with("END FILE"))
        .unwrap_or(false)
}

fn flush_block(
    out: &mut BTreeMap<String, String>,
    block: Option<(String, Vec<&str>)>,
    allowed: &BTreeSet<String>,
) {
    if let Some((path, content)) = block {
        if allowed.contains(&path) {
            out.insert(path, content.join("\n").trim().to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Review output: VERDICT: / REASON: / COMMENTS:
// ---------------------------------------------------------------------------

/// Raw parse of a review response, before changed-file filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReview {
    pub verdict: Verdict,
    pub reason: String,
    pub comments: Vec<InlineComment>,
}

impl Default for RawReview {
    fn default() -> Self {
        Self {
            // Fail closed: no recognizable verdict means Fail.
            verdict: Verdict::Fail,
            reason: String::new(),
            comments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewMode {
    Scanning,
    Comments,
    Done,
}

/// Extract `VERDICT:` / `REASON:` / `COMMENTS:` from a review response.
///
/// The verdict is `Pass` only when the marker's remainder contains `PASS`
/// (case-folded); a missing or unrecognizable marker yields `Fail`. The
/// `COMMENTS:` marker opens a single contiguous block of
/// `FILE:<path>:<line> <body>` lines; the first line that does not match
/// that shape terminates the block.
pub fn parse_review(text: &str) -> RawReview {
    let mut review = RawReview::default();
    let mut mode = ReviewMode::Scanning;

    for line in text.lines() {
        let trimmed = line.trim();

        if mode == ReviewMode::Comments {
            match parse_comment_line(trimmed) {
                Some(comment) => {
                    review.comments.push(comment);
                    continue;
                }
                None => mode = ReviewMode::Done,
            }
        }

        if let Some(rest) = strip_marker(trimmed, "VERDICT:") {
            review.verdict = if rest.trim().to_uppercase().contains("PASS") {
                Verdict::Pass
            } else {
                Verdict::Fail
            };
        } else if let Some(rest) = strip_marker(trimmed, "REASON:") {
            review.reason = rest.trim().to_string();
        } else if strip_marker(trimmed, "COMMENTS:").is_some() && mode == ReviewMode::Scanning {
            mode = ReviewMode::Comments;
        }
    }

    review
}

/// Parse one `FILE:<path>:<line> <body>` line.
///
/// Best-effort split on `:` into at most three parts. A non-integer line
/// token defaults to 1; an empty body becomes "See review.". A path that
/// itself contains a colon will be truncated at the first colon — known
/// fragility of the line format.
fn parse_comment_line(line: &str) -> Option<InlineComment> {
    let after_marker = strip_marker(line, "FILE:")?;
    let (path, rest) = after_marker.split_once(':')?;
    let path = path.trim().to_string();
    let rest = rest.trim();

    let line_no = rest
        .split_whitespace()
        .next()
        .and_then(|tok| tok.parse::<u32>().ok())
        .unwrap_or(1);
    let body = match rest.split_once(char::is_whitespace) {
        Some((_, body)) if !body.trim().is_empty() => body.trim().to_string(),
        _ => "See review.".to_string(),
    };

    Some(InlineComment {
        path,
        line: line_no,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    // --- plan ---

    #[test]
    fn plan_and_files_are_extracted() {
        let text = "PLAN: add greet()\nthen wire it into main\n\nFILES:\nsrc/lib.rs\nsrc/main.rs\n";
        let out = parse_plan(text);
        assert_eq!(out.plan, "add greet()\nthen wire it into main");
        assert_eq!(out.files, vec!["src/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn plan_marker_is_case_insensitive_and_stripped() {
        let out = parse_plan("  plan: Do the thing\n");
        assert_eq!(out.plan, "Do the thing");
    }

    #[test]
    fn file_comments_and_blanks_are_dropped_order_preserved() {
        let text = "FILES:\nb.rs\n# not a file\n\na.rs\n";
        let out = parse_plan(text);
        assert_eq!(out.files, vec!["b.rs", "a.rs"]);
    }

    #[test]
    fn files_before_any_plan_marker() {
        let text = "FILES:\nsrc/x.rs\nPLAN: late plan\n";
        let out = parse_plan(text);
        assert_eq!(out.files, vec!["src/x.rs"]);
        assert_eq!(out.plan, "late plan");
    }

    #[test]
    fn empty_input_degrades_to_default() {
        assert_eq!(parse_plan(""), PlanOutput::default());
        assert_eq!(parse_plan("chit-chat without markers"), PlanOutput::default());
    }

    // --- patches ---

    #[test]
    fn patch_blocks_are_extracted() {
        let text = "--- FILE: src/lib.rs\nfn greet() {}\n--- END FILE\n--- FILE: src/main.rs\nfn main() {}\n";
        let patches = parse_patches(text, &allowed(&["src/lib.rs", "src/main.rs"]));
        assert_eq!(patches["src/lib.rs"], "fn greet() {}");
        assert_eq!(patches["src/main.rs"], "fn main() {}");
    }

    #[test]
    fn content_never_spans_past_next_marker() {
        let text = "--- FILE: a.rs\ncontent a\n--- FILE: b.rs\ncontent b\n";
        let patches = parse_patches(text, &allowed(&["a.rs", "b.rs"]));
        assert_eq!(patches["a.rs"], "content a");
        assert_eq!(patches["b.rs"], "content b");
    }

    #[test]
    fn disallowed_paths_are_silently_dropped() {
        let text = "--- FILE: evil.rs\nrm -rf\n--- END FILE\n--- FILE: ok.rs\nfine\n--- END FILE\n";
        let patches = parse_patches(text, &allowed(&["ok.rs"]));
        assert_eq!(patches.len(), 1);
        assert!(patches.contains_key("ok.rs"));
    }

    #[test]
    fn output_keys_are_subset_of_allowed() {
        let text = "--- FILE: a.rs\nx\n--- FILE: b.rs\ny\n--- FILE: c.rs\nz\n";
        let set = allowed(&["b.rs"]);
        let patches = parse_patches(text, &set);
        assert!(patches.keys().all(|k| set.contains(k)));
    }

    #[test]
    fn eof_terminates_an_open_block() {
        let text = "--- FILE: a.rs\nline one\nline two";
        let patches = parse_patches(text, &allowed(&["a.rs"]));
        assert_eq!(patches["a.rs"], "line one\nline two");
    }

    #[test]
    fn marker_whitespace_is_flexible() {
        let text = "---FILE: a.rs\nx\n---  END FILE\n";
        let patches = parse_patches(text, &allowed(&["a.rs"]));
        assert_eq!(patches["a.rs"], "x");
    }

    #[test]
    fn no_markers_means_no_patches() {
        let patches = parse_patches("just prose", &allowed(&["a.rs"]));
        assert!(patches.is_empty());
    }

    // --- review ---

    #[test]
    fn pass_verdict_any_case() {
        let review = parse_review("VERDICT: pass\nREASON: Looks good\n");
        assert_eq!(review.verdict, Verdict::Pass);
        assert_eq!(review.reason, "Looks good");
    }

    #[test]
    fn missing_marker_fails_closed() {
        let review = parse_review("This change seems fine to me.");
        assert_eq!(review.verdict, Verdict::Fail);
        assert_eq!(review.reason, "");
    }

    #[test]
    fn unrecognizable_verdict_fails_closed() {
        let review = parse_review("VERDICT: maybe?\n");
        assert_eq!(review.verdict, Verdict::Fail);
    }

    #[test]
    fn comments_block_is_parsed() {
        let text = "VERDICT: FAIL\nREASON: Tests failing\nCOMMENTS:\nFILE:src/lib.rs:12 Please handle the empty case\nFILE:src/main.rs:3 Typo\n";
        let review = parse_review(text);
        assert_eq!(review.comments.len(), 2);
        assert_eq!(review.comments[0].path, "src/lib.rs");
        assert_eq!(review.comments[0].line, 12);
        assert_eq!(review.comments[0].body, "Please handle the empty case");
        assert_eq!(review.comments[1].line, 3);
    }

    #[test]
    fn first_non_matching_line_terminates_comments() {
        let text = "COMMENTS:\nFILE:a.rs:1 first\nnot a comment line\nFILE:b.rs:2 second\n";
        let review = parse_review(text);
        assert_eq!(review.comments.len(), 1);
        assert_eq!(review.comments[0].path, "a.rs");
    }

    #[test]
    fn non_integer_line_defaults_to_one() {
        let review = parse_review("COMMENTS:\nFILE:a.rs:twelve Needs work\n");
        assert_eq!(review.comments[0].line, 1);
        assert_eq!(review.comments[0].body, "Needs work");
    }

    #[test]
    fn empty_body_gets_fallback() {
        let review = parse_review("COMMENTS:\nFILE:a.rs:12\n");
        assert_eq!(review.comments[0].line, 12);
        assert_eq!(review.comments[0].body, "See review.");
    }
}
