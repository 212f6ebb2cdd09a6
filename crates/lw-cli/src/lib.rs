//! Logwork CLI library.
//!
//! This crate provides the `lw` command-line interface on top of
//! `lw-core` and the Jira tracker in `lw-jira`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{Config, TrackerKind};
