//! Trellis MCP server binary.
//!
//! This binary runs the MCP server using stdio transport.

use trellis_mcp::TrellisMcpServer;
use trellis_mcp::context::Context;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout carries the MCP protocol, so logs go to
    // stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting trellis-mcp server");

    let context = Context::from_env()?;
    let server = TrellisMcpServer::new(context);
    server.run().await?;

    Ok(())
}
