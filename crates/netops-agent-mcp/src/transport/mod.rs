//! Transport layer for MCP communication.

pub mod framing;
pub mod lines;
pub mod stdio;
#[cfg(feature = "tcp")]
pub mod tcp;

pub use lines::{serve_lines, serve_lines_with_limit, MAX_LINE_BYTES};
pub use stdio::StdioTransport;
#[cfg(feature = "tcp")]
pub use tcp::TcpTransport;
