use serde::{Deserialize, Serialize};

/// Default ceiling for `p=N` when the repository config does not set one.
pub const DEFAULT_MAX_PRIORITY: i64 = 9001;

/// Per-repository settings consulted by the command handlers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepoConfig {
    /// Highest priority a `p=N` command may set.
    pub max_priority: i64,

    /// Every builder a try or auto build runs on, in configuration order.
    pub builders: Vec<String>,

    /// Named builder subsets for `try choose=<name>`.
    ///
    /// `None` means the repository has no choosers at all, which is reported
    /// differently from an unknown chooser name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub try_choosers: Option<Vec<TryChooser>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TryChooser {
    pub name: String,
    pub builders: Vec<String>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            max_priority: DEFAULT_MAX_PRIORITY,
            builders: Vec::new(),
            try_choosers: None,
        }
    }
}

impl RepoConfig {
    /// Chooser names in the order they were configured.
    pub fn chooser_names(&self) -> Vec<String> {
        self.try_choosers
            .iter()
            .flatten()
            .map(|chooser| chooser.name.clone())
            .collect()
    }
}
