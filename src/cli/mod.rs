//! CLI module for the deployer

mod commands;

pub use commands::*;
