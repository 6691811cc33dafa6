//! Deterministic, pure logic of the command core.
//!
//! Core modules perform no I/O. They act on a review object only through the
//! [`ReviewObject`](crate::review::ReviewObject) trait, so the same handlers
//! run against the file store and against recording fakes in tests.

pub mod approval;
pub mod commands;
pub mod sha;
pub mod try_chooser;
pub mod types;
