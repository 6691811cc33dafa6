//! JSON-file backed review objects.
//!
//! [`FileReview`] is the persistence side of [`ReviewObject`]: collaborator
//! calls that persist (`save`, `set_status`, `init_build_res`,
//! `change_treeclosed`) mark the state dirty, and [`FileReview::commit`] writes
//! it back once the handler returns. Comments and label events are queued in an
//! outbox for whatever delivers them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::core::types::LabelEvent;
use crate::review::{RepoStatesIndex, ReviewFields, ReviewObject};

/// Something a handler asked to publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Notification {
    Comment { body: String },
    Label { event: LabelEvent },
}

#[derive(Debug)]
pub struct FileReview {
    path: PathBuf,
    fields: ReviewFields,
    outbox: Vec<Notification>,
    dirty: bool,
}

impl FileReview {
    /// Load review state from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading review state");
        let contents =
            fs::read_to_string(path).with_context(|| format!("read review {}", path.display()))?;
        let fields: ReviewFields = serde_json::from_str(&contents)
            .with_context(|| format!("parse review {}", path.display()))?;
        debug!(num = fields.num, repo = %fields.repo_label, "review state loaded");
        Ok(Self {
            path: path.to_path_buf(),
            fields,
            outbox: Vec::new(),
            dirty: false,
        })
    }

    pub fn outbox(&self) -> &[Notification] {
        &self.outbox
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the state back if any persisting call was made.
    ///
    /// Returns whether the file was written.
    pub fn commit(&mut self) -> Result<bool> {
        if !self.dirty {
            debug!(path = %self.path.display(), "review unchanged, skipping write");
            return Ok(false);
        }
        write_review(&self.path, &self.fields)?;
        self.dirty = false;
        Ok(true)
    }
}

impl ReviewObject for FileReview {
    fn fields(&self) -> &ReviewFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut ReviewFields {
        &mut self.fields
    }

    fn save(&mut self) {
        self.dirty = true;
    }

    fn add_comment(&mut self, body: &str) {
        self.outbox.push(Notification::Comment {
            body: body.to_string(),
        });
    }

    fn change_labels(&mut self, event: LabelEvent) {
        self.outbox.push(Notification::Label { event });
    }

    fn set_status(&mut self, status: &str) {
        self.fields.status = status.to_string();
        self.dirty = true;
    }

    fn init_build_res(&mut self, builders: &[String]) {
        self.fields.build_res = builders.iter().map(|name| (name.clone(), None)).collect();
        self.dirty = true;
    }

    fn change_treeclosed(&mut self, threshold: i64) {
        self.fields.treeclosed = threshold;
        self.dirty = true;
    }

    fn blocked_by_closed_tree(&self) -> i64 {
        if self.fields.priority < self.fields.treeclosed {
            self.fields.treeclosed
        } else {
            0
        }
    }
}

/// Atomically write review state to disk (temp file + rename).
pub fn write_review(path: &Path, fields: &ReviewFields) -> Result<()> {
    debug!(path = %path.display(), num = fields.num, "writing review state");
    let mut buf = serde_json::to_string_pretty(fields)?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("review path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp review {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace review {}", path.display()))?;
    Ok(())
}

/// Build a states index from every `*.json` review file in `dir`.
///
/// Files are read in name order so later duplicates win deterministically.
pub fn load_states_index(dir: &Path) -> Result<RepoStatesIndex> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut index = RepoStatesIndex::new();
    for path in &paths {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read review {}", path.display()))?;
        let fields: ReviewFields = serde_json::from_str(&contents)
            .with_context(|| format!("parse review {}", path.display()))?;
        index.insert(&fields);
    }
    debug!(dir = %dir.display(), files = paths.len(), "states index loaded");
    Ok(index)
}
