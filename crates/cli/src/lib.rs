//! `devtools` command-line client.
//!
//! Thin layer over `devtools-runtime`: argument parsing, settings
//! resolution, command dispatch and the JSON output envelope.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
