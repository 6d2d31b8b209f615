use std::path::PathBuf;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Working tree the code agent mutates; `None` when unconfigured.
    pub workspace: Option<PathBuf>,
}

impl AppState {
    pub fn new(workspace: Option<PathBuf>) -> Self {
        Self { workspace }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_stores_workspace() {
        let state = AppState::new(Some(PathBuf::from("/tmp/wt")));
        assert_eq!(state.workspace, Some(PathBuf::from("/tmp/wt")));
        assert!(AppState::new(None).workspace.is_none());
    }
}
