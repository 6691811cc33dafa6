//! Test-only helpers: a recording review object and config fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::types::LabelEvent;
use crate::repo::{RepoConfig, TryChooser};
use crate::review::{ReviewFields, ReviewObject};

/// One collaborator call made by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Save,
    Comment(String),
    Labels(LabelEvent),
    SetStatus(String),
    InitBuildRes(Vec<String>),
    ChangeTreeclosed(i64),
}

/// In-memory [`ReviewObject`] that records every call in order.
///
/// Collaborator operations that own a field (`set_status`, `init_build_res`,
/// `change_treeclosed`) also apply it, mirroring the real persistence layer.
#[derive(Debug, Clone, Default)]
pub struct RecordingReview {
    pub fields: ReviewFields,
    pub calls: Vec<Call>,
    /// Value returned by `blocked_by_closed_tree`.
    pub blocked_by: i64,
}

impl RecordingReview {
    pub fn new(fields: ReviewFields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn comments(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Comment(body) => Some(body.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn labels(&self) -> Vec<LabelEvent> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Labels(event) => Some(*event),
                _ => None,
            })
            .collect()
    }

    pub fn saves(&self) -> usize {
        self.count(|call| matches!(call, Call::Save))
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }
}

impl ReviewObject for RecordingReview {
    fn fields(&self) -> &ReviewFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut ReviewFields {
        &mut self.fields
    }

    fn save(&mut self) {
        self.calls.push(Call::Save);
    }

    fn add_comment(&mut self, body: &str) {
        self.calls.push(Call::Comment(body.to_string()));
    }

    fn change_labels(&mut self, event: LabelEvent) {
        self.calls.push(Call::Labels(event));
    }

    fn set_status(&mut self, status: &str) {
        self.fields.status = status.to_string();
        self.calls.push(Call::SetStatus(status.to_string()));
    }

    fn init_build_res(&mut self, builders: &[String]) {
        self.fields.build_res = builders.iter().map(|name| (name.clone(), None)).collect();
        self.calls.push(Call::InitBuildRes(builders.to_vec()));
    }

    fn change_treeclosed(&mut self, threshold: i64) {
        self.fields.treeclosed = threshold;
        self.calls.push(Call::ChangeTreeclosed(threshold));
    }

    fn blocked_by_closed_tree(&self) -> i64 {
        self.blocked_by
    }
}

/// Review fields for an open pull request with a fixed head.
pub fn pull_request(num: u64, title: &str, head_sha: &str) -> ReviewFields {
    ReviewFields {
        num,
        title: title.to_string(),
        head_sha: head_sha.to_string(),
        repo_label: "label".to_string(),
        ..ReviewFields::default()
    }
}

/// Repository config with two ordered choosers (`mac`, `wpt`).
pub fn chooser_config() -> RepoConfig {
    let names = |list: &[&str]| list.iter().map(|name| name.to_string()).collect::<Vec<_>>();
    RepoConfig {
        max_priority: 3,
        builders: names(&["mac-rel", "mac-wpt", "linux-wpt-1", "linux-wpt-2"]),
        try_choosers: Some(vec![
            TryChooser {
                name: "mac".to_string(),
                builders: names(&["mac-rel", "mac-wpt"]),
            },
            TryChooser {
                name: "wpt".to_string(),
                builders: names(&["linux-wpt-1", "linux-wpt-2"]),
            },
        ]),
    }
}

/// Temporary directory holding review state files.
pub struct ReviewDir {
    temp: TempDir,
}

impl ReviewDir {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create review tempdir")?;
        Ok(Self { temp })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Write `fields` as `<name>.json` and return its path.
    pub fn write(&self, name: &str, fields: &ReviewFields) -> Result<PathBuf> {
        let path = self.temp.path().join(format!("{name}.json"));
        let mut buf = serde_json::to_string_pretty(fields).context("serialize review")?;
        buf.push('\n');
        fs::write(&path, buf).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, name: &str) -> Result<ReviewFields> {
        let path = self.temp.path().join(format!("{name}.json"));
        let contents =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
    }
}
