//! Command implementations for the daybook daemon.
//!
//! Handles:
//! - start: Load config, load models, start gRPC server
//! - stop: Signal running daemon to stop (via PID file)
//! - status: Check if daemon is running

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use daybook_embeddings::{CandleEmbedder, EmbeddingModel, ModelCache};
use daybook_llm::{ChatModel, OpenAiChat, OpenAiChatConfig};
use daybook_merge::MergeOptions;
use daybook_service::{run_server_with_shutdown, DiaryServiceImpl};
use daybook_types::Settings;

/// Get the PID file path
fn pid_file_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| {
            #[cfg(unix)]
            {
                dirs.runtime_dir()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| dirs.cache_dir().to_path_buf())
            }
            #[cfg(not(unix))]
            {
                dirs.cache_dir().to_path_buf()
            }
        })
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("daybook")
        .join("daemon.pid")
}

/// Write PID to file
fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pid_path, std::process::id().to_string())?;
    info!("Wrote PID file: {:?}", pid_path);
    Ok(())
}

/// Remove PID file
fn remove_pid_file() {
    let pid_path = pid_file_path();
    if pid_path.exists() {
        if let Err(e) = fs::remove_file(&pid_path) {
            warn!("Failed to remove PID file: {}", e);
        } else {
            info!("Removed PID file");
        }
    }
}

/// Read PID from file
fn read_pid_file() -> Option<u32> {
    let pid_path = pid_file_path();
    fs::read_to_string(&pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Check if a process is running
#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // On Unix, sending signal 0 checks if process exists
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    // Without signal 0, assume running if the PID file exists
    true
}

/// Build the chat client from settings.
fn build_chat(settings: &Settings) -> Result<Arc<dyn ChatModel>> {
    let api_key = settings
        .chat
        .api_key
        .clone()
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .context("No chat API key configured (set chat.api_key or OPENAI_API_KEY)")?;

    let mut config = OpenAiChatConfig::openai(api_key, settings.chat.model.clone());
    if let Some(base_url) = &settings.chat.base_url {
        config = config.with_base_url(base_url.clone());
    }
    config.timeout = Duration::from_secs(settings.chat.timeout_secs);
    config.max_retries = settings.chat.max_retries;

    let chat = OpenAiChat::new(config).context("Failed to build chat client")?;
    Ok(Arc::new(chat))
}

/// Load the embedding model from settings, downloading files on first run.
fn build_embedder(settings: &Settings) -> Result<Arc<dyn EmbeddingModel>> {
    let cache = match &settings.embedding.cache_dir {
        Some(dir) => ModelCache::new(dir, settings.embedding.repo_id.clone()),
        None => ModelCache {
            repo_id: settings.embedding.repo_id.clone(),
            ..ModelCache::default()
        },
    };

    let embedder = CandleEmbedder::load(&cache).context("Failed to load embedding model")?;
    Ok(Arc::new(embedder))
}

/// Start the daybook daemon.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Build the chat client and load the embedding model
/// 3. Start gRPC server
/// 4. Handle graceful shutdown on SIGINT/SIGTERM
pub async fn start_daemon(
    config_path: Option<&str>,
    foreground: bool,
    port_override: Option<u16>,
    log_level_override: Option<&str>,
) -> Result<()> {
    // Load configuration
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    // Apply CLI overrides (highest precedence)
    if let Some(port) = port_override {
        settings.grpc_port = port;
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Daybook daemon starting...");
    info!("Configuration:");
    info!("  gRPC address: {}", settings.grpc_addr());
    info!("  Chat model: {}", settings.chat.model);
    info!("  Embedding model: {}", settings.embedding.repo_id);
    info!("  Log level: {}", settings.log_level);

    if !foreground {
        warn!("Background mode not yet implemented, running in foreground");
        warn!("Use a process manager (systemd, launchd) for background operation");
    }

    let chat = build_chat(&settings)?;
    let embedder = build_embedder(&settings)?;
    info!(dimension = embedder.info().dimension, "Embedding model ready");

    let service = DiaryServiceImpl::new(chat, embedder, MergeOptions::from(&settings.merge));

    // Write PID file
    write_pid_file()?;

    // Parse address
    let addr: SocketAddr = settings
        .grpc_addr()
        .parse()
        .context("Invalid gRPC address")?;

    // Create shutdown signal handler
    let shutdown_signal = async {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received Ctrl+C, shutting down...");
            }
            _ = terminate => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    };

    // Start server
    let result = run_server_with_shutdown(addr, service, shutdown_signal).await;

    // Cleanup
    remove_pid_file();

    result.map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Stop the running daemon by sending SIGTERM.
pub fn stop_daemon() -> Result<()> {
    let pid = read_pid_file().context("No PID file found - daemon may not be running")?;

    if !is_process_running(pid) {
        remove_pid_file();
        anyhow::bail!("Daemon not running (stale PID file removed)");
    }

    info!("Stopping daemon (PID {})", pid);

    #[cfg(unix)]
    {
        unsafe {
            if libc::kill(pid as i32, libc::SIGTERM) != 0 {
                anyhow::bail!("Failed to send SIGTERM to daemon");
            }
        }
        println!("Sent SIGTERM to daemon (PID {})", pid);
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!("Stop command not yet implemented on this platform");
    }

    Ok(())
}

/// Show daemon status.
pub fn show_status() -> Result<()> {
    let pid_path = pid_file_path();

    match read_pid_file() {
        Some(pid) if is_process_running(pid) => {
            println!("Daybook daemon is running (PID {})", pid);
            println!("PID file: {:?}", pid_path);
            Ok(())
        }
        Some(pid) => {
            println!(
                "Daybook daemon is NOT running (stale PID {} in {:?})",
                pid, pid_path
            );
            Ok(())
        }
        None => {
            println!("Daybook daemon is NOT running (no PID file)");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_file_path() {
        let path = pid_file_path();
        assert!(path.ends_with("daemon.pid"));
        assert!(path
            .parent()
            .unwrap()
            .to_string_lossy()
            .contains("daybook"));
    }

    #[test]
    fn test_status_no_daemon() {
        // Just verify it doesn't panic
        let result = show_status();
        assert!(result.is_ok());
    }

    #[test]
    fn test_build_chat_requires_api_key() {
        let mut settings = Settings::default();
        settings.chat.api_key = None;
        if std::env::var("OPENAI_API_KEY").is_ok() {
            return;
        }
        assert!(build_chat(&settings).is_err());
    }

    #[test]
    fn test_build_chat_from_settings() {
        let mut settings = Settings::default();
        settings.chat.api_key = Some("sk-test".to_string());
        settings.chat.base_url = Some("http://localhost:8080/v1".to_string());
        assert!(build_chat(&settings).is_ok());
    }
}
