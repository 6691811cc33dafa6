//! Routing of parsed commands to their handlers.
//!
//! Comment parsing happens upstream; by the time a [`Command`] arrives its
//! polarity and arguments are already typed.

use rand::RngCore;
use tracing::debug;

use crate::core::approval::{ApprovalRequest, review_approved, review_rejected};
use crate::core::commands;
use crate::core::types::Polarity;
use crate::repo::RepoConfig;
use crate::review::{RepoStatesIndex, ReviewObject};

/// An operator command with typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `r+` / `r=<approver>`, optionally pinned to a commit.
    Approve { approver: String, sha: String },
    /// `r-`
    Reject,
    /// `p=N`
    Priority(i64),
    /// `try` / `try-`, optionally `choose=<name>`.
    Try {
        polarity: Polarity,
        choose: Option<String>,
    },
    /// `rollup` / `rollup-`
    Rollup(Polarity),
    /// `delegate=<user>`
    DelegateTo(String),
    /// `delegate+`, resolved upstream to the pull request author.
    DelegateAuthor(String),
    /// `delegate-`
    Undelegate,
    Retry,
    Clean,
    Ping,
    StillHere,
    /// `treeclosed=N`
    TreeClosed(u32),
    /// `treeclosed-`
    TreeOpen,
}

impl Command {
    /// Short name used in logs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Approve { .. } => "approve",
            Command::Reject => "reject",
            Command::Priority(_) => "priority",
            Command::Try { .. } => "try",
            Command::Rollup(_) => "rollup",
            Command::DelegateTo(_) => "delegate",
            Command::DelegateAuthor(_) => "delegate+",
            Command::Undelegate => "delegate-",
            Command::Retry => "retry",
            Command::Clean => "clean",
            Command::Ping => "ping",
            Command::StillHere => "still-here",
            Command::TreeClosed(_) => "treeclosed",
            Command::TreeOpen => "treeclosed-",
        }
    }
}

/// Who issued a command and how.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// The bot's own identity.
    pub caller: &'a str,
    /// Identity that wrote the command.
    pub author: &'a str,
    /// False while replaying history; suppresses informational comments.
    pub realtime: bool,
}

/// Inputs a handler may consult besides the review object.
pub struct DispatchEnv<'a> {
    pub config: &'a RepoConfig,
    pub states: &'a RepoStatesIndex,
    pub rng: &'a mut dyn RngCore,
}

/// Run `command` against `state`. Returns whether the command was accepted.
pub fn dispatch<S: ReviewObject>(
    state: &mut S,
    command: &Command,
    context: &CommandContext<'_>,
    env: &mut DispatchEnv<'_>,
) -> bool {
    debug!(
        command = command.name(),
        num = state.fields().num,
        author = context.author,
        realtime = context.realtime,
        "dispatching command"
    );
    match command {
        Command::Approve { approver, sha } => {
            let request = ApprovalRequest {
                realtime: context.realtime,
                approver,
                author: context.author,
                caller: context.caller,
                sha,
            };
            review_approved(state, &request, env.states)
        }
        Command::Reject => {
            review_rejected(state);
            true
        }
        Command::Priority(priority) => commands::set_priority(state, *priority, env.config),
        Command::Try { polarity, choose } => {
            commands::try_build(state, *polarity, env.config, choose.as_deref())
        }
        Command::Rollup(polarity) => {
            commands::rollup(state, *polarity);
            true
        }
        Command::DelegateTo(user) => {
            commands::delegate_to(state, user);
            true
        }
        Command::DelegateAuthor(user) => {
            commands::delegate_positive(state, user, context.realtime);
            true
        }
        Command::Undelegate => {
            commands::delegate_negative(state);
            true
        }
        Command::Retry => {
            commands::retry(state);
            true
        }
        Command::Clean => {
            commands::clean(state);
            true
        }
        Command::Ping => {
            commands::hello_or_ping(state);
            true
        }
        Command::StillHere => {
            commands::still_here(state, &mut *env.rng);
            true
        }
        Command::TreeClosed(threshold) => {
            commands::set_treeclosed(state, *threshold);
            true
        }
        Command::TreeOpen => {
            commands::treeclosed_negative(state);
            true
        }
    }
}
