//! CLI subcommand implementations for the roster-scout binary.

pub mod discover_cmd;
pub mod extract_cmd;
pub mod matches_cmd;
pub mod output;
pub mod serve_cmd;
