//! Command-line interface for spotsnake.
//!
//! This module provides CLI commands for downloading, tagging and inspecting
//! catalog links.

mod commands;

pub use commands::{Cli, Commands, run_command};
