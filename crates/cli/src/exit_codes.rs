//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: CI steps rely on them.
//!
//! | Code | Description                                             |
//! |------|---------------------------------------------------------|
//! | 0    | Success                                                 |
//! | 1    | General error (e.g. a sum left the representable range) |
//! | 2    | Usage error (bad args, missing or ambiguous column)     |
//! | 3    | I/O error (input unreadable, output unwritable)         |
//! | 4    | Parse error (malformed CSV/workbook, no header row)     |
//! | 5    | Config error (settings file unreadable or invalid)      |
//!
//! Every non-zero exit is paired with an `{"error": ...}` document on stdout.

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - failure that is not the caller's input or environment.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown or ambiguous column names.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing/unreadable, or output file not writable.
pub const EXIT_IO: u8 = 3;

/// Input could not be parsed as a table.
pub const EXIT_PARSE: u8 = 4;

/// Settings file exists but cannot be read or parsed.
pub const EXIT_CONFIG: u8 = 5;
