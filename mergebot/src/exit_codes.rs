//! Stable exit codes for mergebot CLI commands.

/// Command accepted (or config written).
pub const OK: i32 = 0;
/// Invalid state file, config or arguments, or an I/O failure.
pub const INVALID: i32 = 1;
/// The handler declined the command and explained why in a comment.
pub const REFUSED: i32 = 4;
