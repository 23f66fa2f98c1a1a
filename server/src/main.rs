//! Modal MCP Server
//!
//! Exposes the Modal CLI as MCP tools over stdio: apps, containers,
//! volumes, secrets, queues, dicts, environments, billing and ephemeral
//! sandboxes.

use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod error;
mod infra;
mod service;

pub use config::Config;
pub use error::{Error, Result};

use infra::process::TokioProcessExecutor;
use service::ModalService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub modal_service: Arc<ModalService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::load()?);

    // stdout carries the MCP protocol, so logs always go to stderr
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    info!("Starting Modal MCP Server");
    info!("Modal CLI: {}", config.cli_bin);
    if let Some(env) = &config.default_environment {
        info!("Default environment: {}", env);
    }

    let executor = Arc::new(TokioProcessExecutor::new());
    let modal_service = Arc::new(ModalService::new(executor, config.clone()));

    let state = AppState {
        config: config.clone(),
        modal_service,
    };

    api::mcp::serve_stdio(state).await
}
