//! TCP transport — one independent session per accepted connection.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use crate::config::ServerConfig;
use crate::protocol::ProtocolHandler;
use crate::session::NetOpsSessionManager;
use crate::tools::ToolRegistry;
use crate::types::{McpError, McpResult};

use super::lines::serve_lines;

/// Pause after an accept error that is not tied to a single connection,
/// e.g. the process running out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Source of incoming connections.
#[async_trait]
pub(crate) trait Acceptor: Send + Sync {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)>;
}

#[async_trait]
impl Acceptor for TcpListener {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }
}

/// Line-delimited JSON-RPC over TCP.
pub struct TcpTransport {
    config: Arc<ServerConfig>,
    registry: Arc<ToolRegistry>,
}

impl TcpTransport {
    pub fn new(config: ServerConfig, registry: Arc<ToolRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            registry,
        }
    }

    /// Bind the given address and serve forever.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let listener = TcpListener::bind(addr).await.map_err(McpError::Io)?;
        tracing::info!("TCP transport listening on {}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Accept connections on an already bound listener.
    ///
    /// A failed accept is logged and skipped; it never stops the listener.
    pub async fn serve(&self, listener: TcpListener) -> McpResult<()> {
        self.serve_from(&listener).await
    }

    pub(crate) async fn serve_from<A: Acceptor>(&self, acceptor: &A) -> McpResult<()> {
        loop {
            match acceptor.accept().await {
                Ok((stream, peer)) => self.spawn_session(stream, peer),
                Err(e) if is_connection_error(&e) => {
                    tracing::warn!("Dropped incoming connection: {e}");
                }
                Err(e) => {
                    tracing::warn!("Accept failed, retrying in {ACCEPT_BACKOFF:?}: {e}");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr) {
        let config = self.config.clone();
        let registry = self.registry.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer, &config, registry).await {
                tracing::warn!(%peer, "Connection ended with error: {e}");
            }
        });
    }
}

/// Errors that concern only the connection being accepted.
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    config: &ServerConfig,
    registry: Arc<ToolRegistry>,
) -> McpResult<()> {
    let session = NetOpsSessionManager::open(config)?;
    tracing::info!(%peer, session = %session.session_id(), "Client connected");

    let handler = ProtocolHandler::new(session, registry);
    let (read_half, write_half) = stream.into_split();
    let outcome = serve_lines(&handler, BufReader::new(read_half), write_half).await;

    tracing::info!(%peer, "Client disconnected");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
    use tokio::sync::Mutex;

    /// Yields the queued errors before handing out real connections.
    struct FailingFirst {
        listener: TcpListener,
        errors: Mutex<VecDeque<io::Error>>,
    }

    #[async_trait]
    impl Acceptor for FailingFirst {
        async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
            if let Some(e) = self.errors.lock().await.pop_front() {
                return Err(e);
            }
            self.listener.accept().await
        }
    }

    #[test]
    fn test_connection_errors_are_classified() {
        assert!(is_connection_error(&io::Error::from(io::ErrorKind::ConnectionAborted)));
        assert!(is_connection_error(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(!is_connection_error(&io::Error::from_raw_os_error(24)));
        assert!(!is_connection_error(&io::Error::new(io::ErrorKind::Other, "no buffer space")));
    }

    #[tokio::test]
    async fn test_listener_survives_accept_failures() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(TcpTransport::new(
            ServerConfig::with_data_dir(dir.path(), Some(3)),
            Arc::new(ToolRegistry::with_defaults().unwrap()),
        ));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let acceptor = FailingFirst {
            listener,
            errors: Mutex::new(VecDeque::from([
                io::Error::from_raw_os_error(24),
                io::Error::from(io::ErrorKind::ConnectionAborted),
                io::Error::from_raw_os_error(23),
            ])),
        };

        let server = {
            let transport = transport.clone();
            tokio::spawn(async move { transport.serve_from(&acceptor).await })
        };

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        write_half
            .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
            .await
            .unwrap();
        let mut lines = BufReader::new(read_half).lines();
        let reply = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
            .await
            .expect("no reply after accept failures")
            .unwrap()
            .unwrap();
        assert_eq!(reply, r#"{"jsonrpc":"2.0","id":1,"result":{}}"#);
        assert!(!server.is_finished());
        server.abort();
    }
}
