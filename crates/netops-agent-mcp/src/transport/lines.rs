//! Line loop shared by every byte-stream transport.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult, OutgoingMessage, RequestId};

use super::framing;

/// Longest line accepted from a peer, newline included.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Serve one session over a reader/writer pair until EOF or a write failure.
///
/// Undecodable lines get a parse-error reply and the loop continues. The
/// handler is closed on every exit path.
pub async fn serve_lines<R, W>(handler: &ProtocolHandler, reader: R, writer: W) -> McpResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    serve_lines_with_limit(handler, reader, writer, MAX_LINE_BYTES).await
}

/// [`serve_lines`] with a custom line length cap. Longer lines are skipped
/// up to their newline and answered with a parse error.
pub async fn serve_lines_with_limit<R, W>(
    handler: &ProtocolHandler,
    reader: R,
    writer: W,
    max_line: usize,
) -> McpResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let outcome = run_loop(handler, reader, writer, max_line).await;
    handler.close().await;
    outcome
}

async fn run_loop<R, W>(
    handler: &ProtocolHandler,
    mut reader: R,
    mut writer: W,
    max_line: usize,
) -> McpResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let bytes_read = (&mut reader)
            .take(max_line as u64)
            .read_until(b'\n', &mut buf)
            .await
            .map_err(McpError::Io)?;

        if bytes_read == 0 {
            tracing::info!("EOF on input, closing session");
            return Ok(());
        }

        if bytes_read == max_line && buf.last() != Some(&b'\n') {
            let skipped = discard_line(&mut reader).await.map_err(McpError::Io)?;
            tracing::warn!("Discarding over-long line ({} bytes)", bytes_read + skipped);
            let err = McpError::ParseError(format!("Message exceeds {max_line} bytes"));
            let reply = OutgoingMessage::Error(err.to_json_rpc_error(RequestId::Null));
            write_message(&mut writer, &reply).await?;
            continue;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Discarding non UTF-8 line: {e}");
                let err = McpError::ParseError(format!("Invalid UTF-8: {e}"));
                let reply = OutgoingMessage::Error(err.to_json_rpc_error(RequestId::Null));
                write_message(&mut writer, &reply).await?;
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = match framing::parse_message(trimmed) {
            Ok(msg) => handler.handle_message(msg).await,
            Err(e) => {
                tracing::warn!("Parse error: {e}");
                Some(OutgoingMessage::Error(
                    e.to_json_rpc_error(framing::recover_id(trimmed)),
                ))
            }
        };

        if let Some(reply) = reply {
            write_message(&mut writer, &reply).await?;
        }
    }
}

/// Consume input through the next newline, returning the bytes skipped.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<usize> {
    let mut skipped = 0;
    loop {
        let (consumed, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(skipped);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(consumed);
        skipped += consumed;
        if done {
            return Ok(skipped);
        }
    }
}

async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    message: &OutgoingMessage,
) -> McpResult<()> {
    let framed = framing::encode(message);
    writer
        .write_all(framed.as_bytes())
        .await
        .map_err(|e| McpError::Transport(format!("write failed: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| McpError::Transport(format!("flush failed: {e}")))?;
    Ok(())
}
