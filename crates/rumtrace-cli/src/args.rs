use crate::types::{LogLevel, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rumtrace")]
#[command(about = "Replay RUM signal feeds through the session lifecycle engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to RUMTRACE_CONFIG or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Feed a JSONL signal file through the engine and print the sessions
    Replay {
        /// One `{"at": ..., "signal": {...}}` object per line
        file: PathBuf,

        #[arg(long, default_value = "plain")]
        format: OutputFormat,

        /// Override session_timeout_secs from the configuration
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Override track_background_events from the configuration
        #[arg(long)]
        track_background_events: bool,
    },

    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        #[arg(long)]
        force: bool,
    },
}
