//! Storage infrastructure: configuration and script files.
//!
//! The `config` sub-module reads the TOML configuration file from the
//! platform-appropriate directory, writes it back when asked, and supplies
//! defaults when no file exists yet (first run).  The `script` sub-module
//! loads automation scripts from the same directory.

pub mod config;
pub mod script;
