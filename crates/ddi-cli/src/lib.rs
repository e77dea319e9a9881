//! ddi-import CLI library.
//!
//! Configuration loading, store construction, command execution and output
//! formatting for the `ddi-import` binary.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Backend, Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
