//! indexbench binary support.
//!
//! Configuration loading and the two subcommands live here so the binary's
//! `main` stays a thin bootstrap and the commands can be driven from tests.

pub mod commands;
pub mod config;
pub mod error;

pub use config::{BenchConfig, CliArgs, Command, RunArgs, SplitArgs};
pub use error::{BenchError, BenchResult};
