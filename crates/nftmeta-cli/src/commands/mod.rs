//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod classify;
pub mod hash;
pub mod process;
