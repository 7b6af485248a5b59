use std::collections::BTreeSet;
use std::path::PathBuf;

/// Options for one reconciliation run, immutable once constructed.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Repository root to scan. `None` resolves to the enclosing git
    /// repository root at run time.
    pub root_path: Option<PathBuf>,
    /// Module names exempt from insert, overwrite, and prune.
    pub excluded: BTreeSet<String>,
    /// Rewrite replace directives that point at the wrong location.
    pub overwrite: bool,
    /// Remove replace directives that are no longer required.
    pub prune: bool,
    /// Emit an informational log line for every reconciliation decision.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            root_path: None,
            excluded: BTreeSet::new(),
            overwrite: false,
            prune: false,
            verbose: true,
        }
    }
}
