//! Approval reconciliation for `r+`, `r=<user>` and `r-`.
//!
//! An approval is pinned to the head commit it was issued against. Reviewer
//! approvals are confirmed with a comment whose hidden trailer names the bot,
//! the approver and the sha; when the bot later reads its own trailer back the
//! approval is replayed through the silent path (`author == caller`).

use tracing::{debug, info, warn};

use crate::core::sha::sha_matches;
use crate::core::types::LabelEvent;
use crate::review::{RepoStatesIndex, ReviewObject};

/// Approver value left in place when `r=me` could not be resolved to a user.
pub const UNRESOLVED_SELF: &str = "me";

/// Title prefixes (compared upper-cased) marking a pull request as unfinished.
pub const WIP_KEYWORDS: &[&str] = &["WIP", "TODO", "[WIP]", "[TODO]", "[DO NOT MERGE]"];

pub const WIP_COMMENT: &str = ":clipboard: Looks like this PR is still in progress, ignoring approval";

pub const ALREADY_APPROVED_COMMENT: &str = ":bulb: This pull request was already approved, no need to approve it again.\n\n- This pull request is currently being tested. If there's no response from the continuous integration service, you may use `retry` to trigger a build again.";

/// One approval command, as handed over by the dispatcher.
#[derive(Debug, Clone, Copy)]
pub struct ApprovalRequest<'a> {
    /// False during backfill passes; suppresses informational comments.
    pub realtime: bool,
    /// Identity the approval is recorded for.
    pub approver: &'a str,
    /// Identity that issued the command.
    pub author: &'a str,
    /// The bot's own identity.
    pub caller: &'a str,
    /// Commit the approval is pinned to; empty means the current head.
    pub sha: &'a str,
}

/// True if `title` starts with one of [`WIP_KEYWORDS`], ignoring case.
pub fn is_wip(title: &str) -> bool {
    let title = title.to_uppercase();
    WIP_KEYWORDS
        .iter()
        .any(|keyword| title.starts_with(keyword))
}

/// Reconcile an approval command with the current state of `state`.
///
/// Returns false only for refused approvals (self-approval or a WIP title).
/// A stale sha from a reviewer is reported but still counts as handled.
pub fn review_approved<S: ReviewObject>(
    state: &mut S,
    request: &ApprovalRequest<'_>,
    states: &RepoStatesIndex,
) -> bool {
    let from_bot = request.author == request.caller;

    if request.approver == UNRESOLVED_SELF || (request.approver == request.caller && !from_bot) {
        debug!(approver = request.approver, "ignoring self approval");
        return false;
    }

    if is_wip(&state.fields().title) {
        debug!(num = state.fields().num, "ignoring approval of work in progress");
        if request.realtime {
            state.add_comment(WIP_COMMENT);
        }
        return false;
    }

    let head_sha = state.fields().head_sha.clone();
    let pinned = request.sha.is_empty() || sha_matches(request.sha, &head_sha);

    if from_bot {
        if pinned {
            record_approval(state, request.approver);
        } else {
            debug!(sha = request.sha, head = %head_sha, "echoed approval no longer matches head");
        }
        return true;
    }

    let (repo_label, num) = {
        let fields = state.fields();
        (fields.repo_label.clone(), fields.num)
    };
    if request.realtime && states.is_testing(&repo_label, num) {
        state.add_comment(ALREADY_APPROVED_COMMENT);
    }

    if !pinned {
        warn!(sha = request.sha, head = %head_sha, "approval names a stale commit");
        if request.realtime {
            state.add_comment(&format!(
                ":scream_cat: `{}` is not a valid commit SHA. Please try again with `{}`.",
                request.sha, head_sha
            ));
        }
        return true;
    }

    record_approval(state, request.approver);

    if request.sha.is_empty() && request.realtime {
        state.add_comment(&format!(
            ":pushpin: Commit {head} has been approved by `{approver}`\n\n<!-- @{caller} r={approver} {head} -->",
            head = head_sha,
            approver = request.approver,
            caller = request.caller,
        ));
        let threshold = state.blocked_by_closed_tree();
        if threshold > 0 {
            state.add_comment(&format!(
                ":evergreen_tree: The tree is currently closed for pull requests below priority {threshold}, this pull request will be tested once the tree is reopened"
            ));
        }
    }
    state.change_labels(LabelEvent::Approved);

    true
}

/// Handle `r-`: drop the current approval.
pub fn review_rejected<S: ReviewObject>(state: &mut S) {
    info!(num = state.fields().num, "approval withdrawn");
    state.fields_mut().approved_by.clear();
    state.save();
    state.change_labels(LabelEvent::Rejected);
}

fn record_approval<S: ReviewObject>(state: &mut S, approver: &str) {
    info!(num = state.fields().num, approver, "approval recorded");
    let fields = state.fields_mut();
    fields.approved_by = approver.to_string();
    fields.try_ = false;
    state.set_status("");
    state.save();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{ReviewFields, STATUS_PENDING};
    use crate::test_support::{Call, RecordingReview, pull_request};

    fn request<'a>(approver: &'a str, author: &'a str, caller: &'a str, sha: &'a str) -> ApprovalRequest<'a> {
        ApprovalRequest {
            realtime: true,
            approver,
            author,
            caller,
            sha,
        }
    }

    /// Pull request that the states index reports as mid-test.
    fn testing(head_sha: &str) -> (RecordingReview, RepoStatesIndex) {
        let mut fields = pull_request(1, "My pull request", head_sha);
        fields.status = STATUS_PENDING.to_string();
        let mut states = RepoStatesIndex::new();
        states.insert(&fields);
        (RecordingReview::new(fields), states)
    }

    #[test]
    fn wip_keywords_match_case_insensitively() {
        assert!(is_wip("WIP work in progress"));
        assert!(is_wip("wip: parser"));
        assert!(is_wip("[do not merge] experiment"));
        assert!(is_wip("TODO"));
        assert!(!is_wip("Fix WIP handling"));
        assert!(!is_wip(""));
    }

    #[test]
    fn approving_as_the_bot_is_ignored() {
        let mut state = RecordingReview::new(pull_request(1, "My pull request", "abcd123"));
        let accepted = review_approved(
            &mut state,
            &request("bors", "user", "bors", ""),
            &RepoStatesIndex::new(),
        );
        assert!(!accepted);
        assert!(state.calls.is_empty());
        assert!(state.fields.approved_by.is_empty());
    }

    #[test]
    fn unresolved_me_is_ignored() {
        let mut state = RecordingReview::new(pull_request(1, "My pull request", "abcd123"));
        let accepted = review_approved(
            &mut state,
            &request("me", "user", "user", ""),
            &RepoStatesIndex::new(),
        );
        assert!(!accepted);
        assert!(state.calls.is_empty());
    }

    #[test]
    fn wip_title_comments_when_realtime() {
        let mut state = RecordingReview::new(pull_request(1, "WIP work in progress", "abcd123"));
        let accepted = review_approved(
            &mut state,
            &request("user", "user", "user", ""),
            &RepoStatesIndex::new(),
        );
        assert!(!accepted);
        assert_eq!(state.calls, vec![Call::Comment(WIP_COMMENT.to_string())]);
    }

    #[test]
    fn wip_title_is_silent_when_not_realtime() {
        let mut state = RecordingReview::new(pull_request(1, "WIP work in progress", "abcd123"));
        let req = ApprovalRequest {
            realtime: false,
            ..request("user", "user", "user", "")
        };
        assert!(!review_approved(&mut state, &req, &RepoStatesIndex::new()));
        assert!(state.calls.is_empty());
    }

    #[test]
    fn echoed_approval_is_recorded_silently() {
        let mut state = RecordingReview::new(pull_request(1, "My pull request", "abcd123"));
        state.fields.try_ = true;
        state.fields.status = "failure".to_string();

        let accepted = review_approved(
            &mut state,
            &request("user", "user", "user", "abcd123"),
            &RepoStatesIndex::new(),
        );

        assert!(accepted);
        assert_eq!(state.fields.approved_by, "user");
        assert!(!state.fields.try_);
        assert_eq!(
            state.calls,
            vec![Call::SetStatus(String::new()), Call::Save]
        );
    }

    #[test]
    fn echoed_approval_with_stale_sha_changes_nothing() {
        let (mut state, states) = testing("sdf4567");
        let accepted = review_approved(
            &mut state,
            &request("user", "user", "user", "abcd123"),
            &states,
        );
        assert!(accepted);
        assert!(state.calls.is_empty());
        assert!(state.fields.approved_by.is_empty());
    }

    #[test]
    fn reviewer_approval_of_head_notes_running_build() {
        let (mut state, states) = testing("abcd123");
        state.fields.try_ = true;

        let accepted = review_approved(
            &mut state,
            &request("user1", "user1", "user2", "abcd123"),
            &states,
        );

        assert!(accepted);
        assert_eq!(state.fields.approved_by, "user1");
        assert!(!state.fields.try_);
        assert!(state.fields.status.is_empty());
        assert_eq!(state.saves(), 1);
        assert_eq!(state.comments(), vec![ALREADY_APPROVED_COMMENT]);
        assert_eq!(state.labels(), vec![LabelEvent::Approved]);
    }

    #[test]
    fn reviewer_approval_with_stale_sha_names_real_head() {
        let (mut state, states) = testing("sdf4567");

        let accepted = review_approved(
            &mut state,
            &request("user1", "user1", "user2", "abcd123"),
            &states,
        );

        assert!(accepted);
        assert_eq!(
            state.comments(),
            vec![
                ALREADY_APPROVED_COMMENT,
                ":scream_cat: `abcd123` is not a valid commit SHA. Please try again with `sdf4567`.",
            ]
        );
        assert!(state.fields.approved_by.is_empty());
        assert_eq!(state.saves(), 0);
        assert!(state.labels().is_empty());
    }

    #[test]
    fn reviewer_approval_of_blank_sha_confirms_with_trailer() {
        let (mut state, states) = testing("sdf4567");
        state.blocked_by = 0;

        assert!(review_approved(
            &mut state,
            &request("user1", "user1", "user2", ""),
            &states,
        ));

        assert_eq!(
            state.comments(),
            vec![
                ALREADY_APPROVED_COMMENT,
                ":pushpin: Commit sdf4567 has been approved by `user1`\n\n<!-- @user2 r=user1 sdf4567 -->",
            ]
        );
        assert_eq!(state.fields.approved_by, "user1");
        assert_eq!(state.labels(), vec![LabelEvent::Approved]);
    }

    #[test]
    fn reviewer_approval_while_tree_closed_defers_testing() {
        let (mut state, states) = testing("sdf4567");
        state.blocked_by = 1;

        assert!(review_approved(
            &mut state,
            &request("user1", "user1", "user2", ""),
            &states,
        ));

        assert_eq!(
            state.comments(),
            vec![
                ALREADY_APPROVED_COMMENT,
                ":pushpin: Commit sdf4567 has been approved by `user1`\n\n<!-- @user2 r=user1 sdf4567 -->",
                ":evergreen_tree: The tree is currently closed for pull requests below priority 1, this pull request will be tested once the tree is reopened",
            ]
        );
        assert_eq!(state.labels(), vec![LabelEvent::Approved]);
    }

    #[test]
    fn reviewer_approval_without_running_build_skips_notice() {
        let mut state = RecordingReview::new(pull_request(4, "Fix parser", "abcd1234ef"));
        let accepted = review_approved(
            &mut state,
            &request("reviewer", "reviewer", "bot", "abcd123"),
            &RepoStatesIndex::new(),
        );
        assert!(accepted);
        assert!(state.comments().is_empty());
        assert_eq!(state.fields.approved_by, "reviewer");
    }

    #[test]
    fn backfill_approval_records_without_comments() {
        let (mut state, states) = testing("sdf4567");
        let req = ApprovalRequest {
            realtime: false,
            ..request("user1", "user1", "user2", "")
        };
        assert!(review_approved(&mut state, &req, &states));
        assert!(state.comments().is_empty());
        assert_eq!(state.fields.approved_by, "user1");
        assert_eq!(state.labels(), vec![LabelEvent::Approved]);
    }

    #[test]
    fn rejection_clears_approval() {
        let mut state = RecordingReview::new(ReviewFields {
            approved_by: "user".to_string(),
            ..ReviewFields::default()
        });
        review_rejected(&mut state);
        assert!(state.fields.approved_by.is_empty());
        assert_eq!(
            state.calls,
            vec![Call::Save, Call::Labels(LabelEvent::Rejected)]
        );
    }
}
