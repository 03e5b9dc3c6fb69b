//! Command-line interface for training and playing against models
//!
//! Each subcommand lives in [`commands`] with its clap arguments and an
//! `execute` entry point; the binary only dispatches.

pub mod commands;
pub mod config;
pub mod output;
