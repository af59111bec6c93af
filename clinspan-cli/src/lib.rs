//! clinspan CLI library
//!
//! This library provides the command-line interface for annotating clinical
//! notes with the clinspan engine.

pub mod commands;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
