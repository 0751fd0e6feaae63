//! CLI library components for the pulse runner.

pub mod commands;
pub mod logging;
pub mod types;
