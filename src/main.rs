#![warn(clippy::pedantic)]

mod config;
mod error;
mod model;
mod playback;
mod server;
mod speak;
mod tts;

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::server::SpeakServer;
use crate::speak::SpeakTool;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP stream.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    config::init()?;
    let config = config::get();

    info!(tts_url = %config.tts_url, tmp_path = %config.tmp_path.display(), "Starting {}", server::SERVER_NAME);

    let tool = SpeakTool::from_config(config)?;

    let service = SpeakServer::new(tool)
        .serve(stdio())
        .await
        .context("Failed to start MCP server on stdio")?;

    tokio::select! {
        quit = service.waiting() => {
            let reason = quit.context("MCP server task failed")?;
            info!(?reason, "Client disconnected, shutting down.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down.");
        }
    }

    Ok(())
}
