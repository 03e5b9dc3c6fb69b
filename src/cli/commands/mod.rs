//! CLI subcommands

pub mod models;
pub mod play;
pub mod train;
