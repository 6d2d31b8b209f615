use serde::{Deserialize, Serialize};

/// Immutable snapshot of a tracker issue, built once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueContext {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    /// Lifecycle state as reported by the tracker (`open` / `closed`).
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let ctx = IssueContext {
            number: 7,
            title: "Add greeting function".to_string(),
            body: "Please add greet()".to_string(),
            labels: vec!["enhancement".to_string()],
            state: "open".to_string(),
        };
        let json = serde_json::to_string(&ctx).unwrap();
        let parsed: IssueContext = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ctx);
    }
}
