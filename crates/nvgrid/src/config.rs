//! Command line and environment configuration

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Engine executable when `NVGRID_NVIM` is unset
pub const DEFAULT_ENGINE: &str = "nvim";

/// Log filter when neither `NVGRID_LOG` nor `RUST_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Every argument is handed to the engine untouched
#[derive(Parser, Debug)]
#[command(
    name = "nvgrid",
    about = "Terminal UI for an embedded nvim",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Args {
    /// Arguments forwarded to the engine
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub engine_args: Vec<String>,
}

/// Runtime configuration, assembled once at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Engine executable
    pub engine: String,

    /// Arguments given on the command line, without `--embed`
    pub args: Vec<String>,

    /// `EnvFilter` directive for the log files
    pub log_filter: String,

    /// Directory holding the log files
    pub log_dir: PathBuf,
}

impl Config {
    /// Build the configuration from parsed arguments and the process environment
    pub fn from_args(args: Args) -> Result<Self> {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(Self::from_parts(args, home, |name| std::env::var(name).ok()))
    }

    /// Build the configuration with an explicit environment lookup
    pub fn from_parts(
        args: Args,
        log_dir: PathBuf,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let engine = env("NVGRID_NVIM")
            .filter(|engine| !engine.is_empty())
            .unwrap_or_else(|| DEFAULT_ENGINE.to_string());

        let log_filter = env("NVGRID_LOG")
            .or_else(|| env("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            engine,
            args: args.engine_args,
            log_filter,
            log_dir,
        }
    }

    /// Full argument list for the engine process
    pub fn engine_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push("--embed".to_string());
        args.extend(self.args.iter().cloned());
        args
    }
}
