//! Stdio transport — reads JSON-RPC from stdin, writes to stdout.

use tokio::io::BufReader;

use crate::protocol::ProtocolHandler;
use crate::types::McpResult;

use super::lines::serve_lines;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Run the transport loop until stdin reaches EOF.
    pub async fn run(&self) -> McpResult<()> {
        tracing::info!("Stdio transport started");
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        serve_lines(&self.handler, reader, writer).await
    }
}
