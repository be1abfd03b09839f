//! Daybook Daemon
//!
//! A diary-writing assistant service: merges rough memos into a diary in
//! the user's own writing style, and analyzes finished diaries.
//!
//! # Usage
//!
//! ```bash
//! daybook-daemon start [--foreground] [--port PORT]
//! daybook-daemon stop
//! daybook-daemon status
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/daybook/config.toml)
//! 3. Environment variables (DAYBOOK_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use daybook_daemon::{show_status, start_daemon, stop_daemon, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { foreground, port } => {
            start_daemon(
                cli.config.as_deref(),
                foreground,
                port,
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Stop => {
            stop_daemon()?;
        }
        Commands::Status => {
            show_status()?;
        }
    }

    Ok(())
}
