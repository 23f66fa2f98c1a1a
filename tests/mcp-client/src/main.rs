//! MCP Client Smoke Test
//!
//! Spawns the Modal MCP server over stdio, lists its tools and calls the
//! tools that answer without touching the Modal CLI (safety gates and
//! path validation), checking the exact responses.

use anyhow::{ensure, Result};
use rmcp::{
    model::CallToolRequestParam,
    service::{RoleClient, RunningService},
    transport::{ConfigureCommandExt, TokioChildProcess},
    ServiceExt,
};
use serde_json::json;
use tokio::process::Command;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const EXPECTED_TOOL_COUNT: usize = 39;

/// Call a tool and return the text of its first content item
async fn call_tool(
    client: &RunningService<RoleClient, ()>,
    name: &str,
    args: serde_json::Value,
) -> Result<String> {
    info!("📤 Calling tool: {}", name);
    info!("   Arguments: {}", serde_json::to_string(&args)?);

    let result = client
        .call_tool(CallToolRequestParam {
            name: name.to_string().into(),
            arguments: args.as_object().cloned(),
        })
        .await?;

    let content = result
        .content
        .first()
        .and_then(|c| c.raw.as_text())
        .map(|t| t.text.clone())
        .unwrap_or_else(|| "No content".into());

    if result.is_error.unwrap_or(false) {
        error!("❌ Tool error: {}", content);
    } else {
        info!("✅ Result: {}", content);
    }

    Ok(content)
}

/// Call a tool and require an exact response
async fn expect_tool(
    client: &RunningService<RoleClient, ()>,
    name: &str,
    args: serde_json::Value,
    expected: &str,
) -> Result<()> {
    let content = call_tool(client, name, args).await?;
    ensure!(
        content == expected,
        "{} returned {:?}, expected {:?}",
        name,
        content,
        expected
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    info!("🚀 Starting MCP Client Smoke Test");

    let server_path = std::env::var("MODAL_MCP_SERVER_PATH")
        .unwrap_or_else(|_| "../../target/debug/modal-mcp".to_string());
    info!("📡 Connecting to MCP server: {}", server_path);

    let transport = TokioChildProcess::new(Command::new(&server_path).configure(|cmd| {
        cmd.env("RUST_LOG", "warn");
    }))?;
    let client = ().serve(transport).await?;
    info!("✅ Connected to MCP server");

    // ========================================================================
    // Tool listing
    // ========================================================================
    let tools = client.list_tools(None).await?;
    info!("Available tools ({}):", tools.tools.len());
    for tool in &tools.tools {
        info!("  - {}", tool.name);
    }
    ensure!(
        tools.tools.len() == EXPECTED_TOOL_COUNT,
        "expected {} tools, got {}",
        EXPECTED_TOOL_COUNT,
        tools.tools.len()
    );

    // ========================================================================
    // Safety gates
    // ========================================================================
    expect_tool(
        &client,
        "delete_volume",
        json!({ "volume_name": "smoke-test" }),
        "Safety check: set confirm=True to actually delete the volume. This cannot be undone.",
    )
    .await?;

    expect_tool(
        &client,
        "delete_secret",
        json!({ "secret_name": "smoke-test", "confirm": false }),
        "Safety check: set confirm=True to actually delete the secret. This cannot be undone.",
    )
    .await?;

    expect_tool(
        &client,
        "delete_environment",
        json!({ "env_name": "smoke-test" }),
        "Safety check: set confirm=True to actually delete the environment. All resources in it will be deleted.",
    )
    .await?;

    // ========================================================================
    // Validation
    // ========================================================================
    expect_tool(
        &client,
        "deploy_app",
        json!({ "app_path": "relative/path.py" }),
        "Error: Path must be absolute, got: relative/path.py",
    )
    .await?;

    expect_tool(
        &client,
        "upload_to_volume",
        json!({ "volume_name": "smoke-test", "local_path": "/definitely/not/here.bin" }),
        "Error: Local path not found: /definitely/not/here.bin",
    )
    .await?;

    expect_tool(
        &client,
        "create_secret",
        json!({ "secret_name": "smoke-test", "key_values": {} }),
        "Error: key_values must contain at least one key-value pair.",
    )
    .await?;

    client.cancel().await?;
    info!("🎉 All smoke checks passed");
    Ok(())
}
