//! MCP (Model Context Protocol) API layer
//!
//! Serves the Modal tools over stdio so an AI assistant can drive the
//! Modal CLI.

mod handler;
mod types;

pub use handler::ModalMcpHandler;

use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::info;

use crate::AppState;

/// Start MCP server in stdio mode
///
/// stdout carries the protocol, so nothing else may write to it.
pub async fn serve_stdio(state: AppState) -> anyhow::Result<()> {
    info!(
        "Starting MCP server in stdio mode (command timeout {}s, deploy timeout {}s)",
        state.config.command_timeout, state.config.deploy_timeout
    );

    let handler = ModalMcpHandler::new(state);
    let service = handler.serve(stdio()).await?;

    info!("MCP server ready, waiting for requests...");
    service.waiting().await?;

    info!("MCP server shutdown");
    Ok(())
}
