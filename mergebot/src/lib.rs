//! Command and approval core of a merge-queue bot.
//!
//! Operators steer pull requests through the queue with commands such as
//! `r+`, `try`, `p=N` or `treeclosed=N`. This crate decides, for one parsed
//! command and the current state of one pull request, which changes are legal,
//! which comments to post and which label transition to signal. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic handlers (approval reconciliation, try
//!   choosers, priorities, tree closure). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (TOML repo config, JSON review files).
//!
//! [`dispatch`] routes a typed [`dispatch::Command`] to its handler; the review
//! object itself is only reached through [`review::ReviewObject`].

pub mod core;
pub mod dispatch;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod repo;
pub mod review;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
