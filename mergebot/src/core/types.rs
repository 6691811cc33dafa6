//! Shared deterministic types for the command core.
//!
//! These are the stable contracts between handlers and their collaborators:
//! the label vocabulary, command polarity, and the refusals a handler reports
//! back as comments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label transition handed to the external label synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelEvent {
    Try,
    Approved,
    Rejected,
}

/// Whether a toggle command was issued in its positive (`try`) or negative
/// (`try-`) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn is_positive(self) -> bool {
        self == Polarity::Positive
    }
}

/// Outcome recorded for one builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildOutcome {
    Success,
    Failure,
}

/// Refusals reported to the user instead of mutating state.
///
/// The `Display` text is the user-visible part of the comment body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("This repo does not have try choosers set up")]
    ChooserNotConfigured,
    #[error(
        "There is no try chooser {name} for this repo, try one of: {}",
        .available.join(", ")
    )]
    ChooserNotFound {
        name: String,
        available: Vec<String>,
    },
    #[error("Priority higher than {max} is ignored.")]
    PriorityExceeded { max: i64 },
}
