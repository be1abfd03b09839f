//! CLI argument parsing for the daybook daemon.
//!
//! CLI flags override every other configuration source.

use clap::{Parser, Subcommand};

/// Daybook Daemon
///
/// A diary-writing assistant service: merges rough memos into a diary in
/// the user's own writing style, and analyzes finished diaries.
#[derive(Parser, Debug)]
#[command(name = "daybook-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/daybook/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the daybook daemon
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,

        /// Override gRPC port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Stop the running daemon
    Stop,

    /// Show daemon status
    Status,
}
