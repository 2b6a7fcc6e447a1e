//! CLI subcommand implementations.

pub mod benchmark;
pub mod changes;
pub mod diff;
pub mod members;
