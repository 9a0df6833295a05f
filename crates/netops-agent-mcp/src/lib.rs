//! NetOps Agent MCP Server — network operations tools over line-delimited JSON-RPC.

pub mod config;
pub mod protocol;
pub mod repl;
pub mod router;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::ServerConfig;
pub use protocol::ProtocolHandler;
pub use router::QueryRouter;
pub use session::NetOpsSessionManager;
pub use tools::ToolRegistry;
pub use transport::StdioTransport;
#[cfg(feature = "tcp")]
pub use transport::TcpTransport;
