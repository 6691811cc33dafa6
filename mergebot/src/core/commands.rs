//! Handlers for the operator commands other than approval.
//!
//! Each handler persists through `save` only on the branch that mutates state.
//! Refusals are posted as a single comment and leave state untouched.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::core::try_chooser::resolve_try_chooser;
use crate::core::types::{CommandError, LabelEvent, Polarity};
use crate::repo::RepoConfig;
use crate::review::{ReviewObject, TREE_OPEN};

pub const PING_COMMENT: &str = ":sleepy: I'm awake I'm awake";

/// Every line the keepalive may answer with.
pub const PORTAL_TURRET_DIALOG: &[&str] = &["Target acquired", "Activated", "There you are"];

pub const PORTAL_TURRET_IMAGE: &str = "https://cloud.githubusercontent.com/assets/1617736/22222924/c07b2a1c-e16d-11e6-91b3-ac659550585c.png";

/// Handle `treeclosed=N`: only pull requests at priority N or above may run.
pub fn set_treeclosed<S: ReviewObject>(state: &mut S, threshold: u32) {
    info!(threshold, "tree closed");
    state.change_treeclosed(i64::from(threshold));
    state.save();
}

/// Handle `treeclosed-`.
pub fn treeclosed_negative<S: ReviewObject>(state: &mut S) {
    info!("tree reopened");
    state.change_treeclosed(TREE_OPEN);
    state.save();
}

/// Handle `delegate=<user>`.
pub fn delegate_to<S: ReviewObject>(state: &mut S, user: &str) {
    state.fields_mut().delegate = user.to_string();
    state.save();
    state.add_comment(&delegated_comment(user));
}

/// Handle `delegate-`.
pub fn delegate_negative<S: ReviewObject>(state: &mut S) {
    state.fields_mut().delegate.clear();
    state.save();
}

/// Handle `delegate+`, which delegates to the pull request author.
pub fn delegate_positive<S: ReviewObject>(state: &mut S, user: &str, realtime: bool) {
    state.fields_mut().delegate = user.to_string();
    state.save();
    if realtime {
        state.add_comment(&delegated_comment(user));
    }
}

fn delegated_comment(user: &str) -> String {
    format!(":v: @{user} can now approve this pull request")
}

/// Handle `ping`.
pub fn hello_or_ping<S: ReviewObject>(state: &mut S) {
    state.add_comment(PING_COMMENT);
}

/// Handle `are you still there?` with a random turret line.
pub fn still_here<S: ReviewObject, G: Rng + ?Sized>(state: &mut S, rng: &mut G) {
    let dialog = PORTAL_TURRET_DIALOG
        .choose(rng)
        .copied()
        .unwrap_or(PORTAL_TURRET_DIALOG[0]);
    state.add_comment(&format!(":cake: {dialog}\n\n![]({PORTAL_TURRET_IMAGE})"));
}

/// Handle `rollup` / `rollup-`.
pub fn rollup<S: ReviewObject>(state: &mut S, polarity: Polarity) {
    state.fields_mut().rollup = polarity.is_positive();
    state.save();
}

/// Handle `try` / `try-`, optionally restricted with `choose=<name>`.
///
/// Returns false when the chooser cannot be resolved; nothing is saved,
/// labelled or reset in that case.
pub fn try_build<S: ReviewObject>(
    state: &mut S,
    polarity: Polarity,
    config: &RepoConfig,
    choose: Option<&str>,
) -> bool {
    let is_try = polarity.is_positive();
    let choose = if is_try { choose } else { None };

    if let Some(Err(err)) = choose.map(|name| resolve_try_chooser(config, name)) {
        warn!(chooser = ?choose, %err, "try chooser refused");
        state.add_comment(&format!(":slightly_frowning_face: {err}"));
        return false;
    }
    debug!(num = state.fields().num, chooser = ?choose, is_try, "try chooser accepted");

    let fields = state.fields_mut();
    fields.try_ = is_try;
    fields.try_choose = choose.map(str::to_string);
    state.init_build_res(&[]);
    state.save();
    if is_try {
        state.change_labels(LabelEvent::Try);
    }
    true
}

/// Handle `clean`: forget the merge commit and build results.
pub fn clean<S: ReviewObject>(state: &mut S) {
    state.fields_mut().merge_sha.clear();
    state.init_build_res(&[]);
    state.save();
}

/// Handle `retry`: re-queue whichever build the pull request is waiting on.
pub fn retry<S: ReviewObject>(state: &mut S) {
    state.set_status("");
    let event = if state.fields().try_ {
        LabelEvent::Try
    } else {
        LabelEvent::Approved
    };
    state.change_labels(event);
}

/// Handle `p=N`. Returns false, with a comment, if N exceeds the repository maximum.
pub fn set_priority<S: ReviewObject>(state: &mut S, priority: i64, config: &RepoConfig) -> bool {
    if priority > config.max_priority {
        let err = CommandError::PriorityExceeded {
            max: config.max_priority,
        };
        warn!(priority, max = config.max_priority, "priority refused");
        state.add_comment(&format!(":stop_sign: {err}"));
        return false;
    }
    state.fields_mut().priority = priority;
    state.save();
    true
}
