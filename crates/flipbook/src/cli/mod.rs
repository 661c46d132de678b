//! Subcommand implementations.

pub mod animate;
pub mod config;
