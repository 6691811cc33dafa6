//! I/O adapters around the command core.

pub mod config;
pub mod review_store;
