// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `interactive-feedback`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "interactive-feedback",
    version,
    about = "Line-delimited JSON-RPC tool server that asks a human for feedback.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to an optional server settings file (TOML).
    ///
    /// When omitted, built-in defaults are used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FEEDBACK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Desktop prompt script, overriding `[feedback].gui_script`.
    #[arg(long, value_name = "PATH")]
    pub gui_script: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
