//! Exit codes for the CLI

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Changelog markup could not be parsed
pub const PARSE_ERROR: i32 = 3;

/// Changelog parsed but has unresolved references or substitutions
pub const VALIDATION_ERROR: i32 = 5;
