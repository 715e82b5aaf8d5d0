//! Standard exit codes (BSD sysexits.h compatible)

/// Command line usage error, e.g. an id that is not in the tree
pub const USAGE: i32 = 64;

/// Data format error
pub const DATAERR: i32 = 65;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
