//! The review object the command core operates on.
//!
//! Storage, comment delivery and label synchronization live outside the core.
//! Handlers only see the [`ReviewObject`] trait, so any persistence layer (or a
//! recording fake in tests) can stand behind it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{BuildOutcome, LabelEvent};

/// `treeclosed` value for an open tree.
pub const TREE_OPEN: i64 = -1;

/// CI status token for a build that is currently running.
pub const STATUS_PENDING: &str = "pending";

/// Durable fields of a pull request tracked by the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewFields {
    pub num: u64,
    pub title: String,
    pub head_sha: String,
    pub merge_sha: String,
    /// Identity that approved the current head; empty when unapproved.
    pub approved_by: String,
    /// CI status token (`""`, `pending`, `success`, `failure`, ...).
    pub status: String,
    /// True while a try build is requested.
    #[serde(rename = "try")]
    pub try_: bool,
    pub try_choose: Option<String>,
    pub rollup: bool,
    pub delegate: String,
    pub priority: i64,
    /// `-1` when open, otherwise pull requests below this priority wait.
    pub treeclosed: i64,
    pub repo_label: String,
    pub build_res: BTreeMap<String, Option<BuildOutcome>>,
}

impl Default for ReviewFields {
    fn default() -> Self {
        Self {
            num: 0,
            title: String::new(),
            head_sha: String::new(),
            merge_sha: String::new(),
            approved_by: String::new(),
            status: String::new(),
            try_: false,
            try_choose: None,
            rollup: false,
            delegate: String::new(),
            priority: 0,
            treeclosed: TREE_OPEN,
            repo_label: String::new(),
            build_res: BTreeMap::new(),
        }
    }
}

/// Capabilities a handler needs from the review object.
///
/// Field access goes through [`fields`](ReviewObject::fields) and
/// [`fields_mut`](ReviewObject::fields_mut); everything else is a collaborator
/// operation owned by the persistence/notification layer. Delivery of comments
/// and labels is fire-and-forget from the handler's point of view.
pub trait ReviewObject {
    fn fields(&self) -> &ReviewFields;
    fn fields_mut(&mut self) -> &mut ReviewFields;

    /// Persist the current fields.
    fn save(&mut self);
    /// Post a comment on the pull request.
    fn add_comment(&mut self, body: &str);
    /// Hand a label transition to the label synchronizer.
    fn change_labels(&mut self, event: LabelEvent);
    /// Record a new CI status (persisted by the collaborator).
    fn set_status(&mut self, status: &str);
    /// Reset build results to `builders`, all unset.
    fn init_build_res(&mut self, builders: &[String]);
    /// Set the tree-closed threshold (`-1` reopens).
    fn change_treeclosed(&mut self, threshold: i64);
    /// Priority threshold currently blocking this pull request, or 0.
    fn blocked_by_closed_tree(&self) -> i64;
}

/// What the states index remembers about one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSnapshot {
    pub status: String,
}

impl ReviewSnapshot {
    pub fn is_testing(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

/// Read-only view of the queue's pull requests, keyed by repo label then number.
///
/// Built by the caller as a snapshot before a command runs. Only single-object
/// lookups are offered; nothing should depend on iterating other entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoStatesIndex {
    repos: BTreeMap<String, BTreeMap<u64, ReviewSnapshot>>,
}

impl RepoStatesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `fields` under its repo label, replacing any earlier snapshot.
    pub fn insert(&mut self, fields: &ReviewFields) {
        self.repos.entry(fields.repo_label.clone()).or_default().insert(
            fields.num,
            ReviewSnapshot {
                status: fields.status.clone(),
            },
        );
    }

    pub fn lookup(&self, repo_label: &str, num: u64) -> Option<&ReviewSnapshot> {
        self.repos.get(repo_label)?.get(&num)
    }

    /// True if the indexed copy of `repo_label#num` has a build in flight.
    pub fn is_testing(&self, repo_label: &str, num: u64) -> bool {
        self.lookup(repo_label, num)
            .is_some_and(ReviewSnapshot::is_testing)
    }
}
