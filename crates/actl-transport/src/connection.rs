//! Per-connection read/route/write loop.

use std::io;
use std::sync::Arc;

use actl_protocol::{CommandFailure, FrameDecoder, FrameError, Response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::client::{ClientConnection, ConnectionRegistry};
use crate::server::RequestHandler;
use crate::shutdown::ShutdownSignal;

const READ_CHUNK: usize = 4096;

/// Why a connection loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseReason {
    PeerClosed,
    Shutdown,
    FrameTooLong,
    Transport,
}

/// Everything a connection loop needs besides the socket.
pub(crate) struct ConnectionContext<H> {
    pub handler: Arc<H>,
    pub registry: Arc<ConnectionRegistry>,
    pub max_frame_len: Option<usize>,
    pub shutdown: ShutdownSignal,
}

/// Serve one client until it disconnects, misbehaves, or shutdown begins.
///
/// The client must already be registered; it is removed here on exit.
pub(crate) async fn serve_connection<H: RequestHandler>(
    mut stream: TcpStream,
    client: ClientConnection,
    mut ctx: ConnectionContext<H>,
) -> CloseReason {
    info!("Client connected: {} from {}", client.id, client.remote_addr);

    let mut decoder = match ctx.max_frame_len {
        Some(limit) => FrameDecoder::new().with_max_frame_len(limit),
        None => FrameDecoder::new(),
    };
    let reason = run_loop(&mut stream, &client, &mut decoder, &mut ctx).await;

    let discarded = decoder.finish();
    if discarded > 0 {
        warn!("Discarded {discarded} bytes of unterminated frame from {}", client.id);
    }
    if let Err(error) = stream.shutdown().await {
        debug!("Socket shutdown for {} failed: {error}", client.id);
    }
    ctx.registry.remove(&client.id);
    info!(
        "Client disconnected: {} ({reason:?}, open for {:?}, total: {})",
        client.id,
        client.age(),
        ctx.registry.len()
    );
    reason
}

async fn run_loop<H: RequestHandler>(
    stream: &mut TcpStream,
    client: &ClientConnection,
    decoder: &mut FrameDecoder,
    ctx: &mut ConnectionContext<H>,
) -> CloseReason {
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let read = tokio::select! {
            _ = ctx.shutdown.wait() => return CloseReason::Shutdown,
            read = stream.read(&mut chunk) => read,
        };
        let bytes_read = match read {
            Ok(0) => return CloseReason::PeerClosed,
            Ok(n) => n,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => {
                warn!("Read error for {}: {error}", client.id);
                return CloseReason::Transport;
            }
        };

        for frame in decoder.feed(&chunk[..bytes_read]) {
            let frame = match frame {
                Ok(frame) => frame,
                Err(FrameError::TooLong { limit }) => {
                    warn!("Frame from {} exceeds {limit} bytes, closing", client.id);
                    let line = Response::from(CommandFailure::FrameTooLong).to_line();
                    let _ = write_line(stream, &line).await;
                    return CloseReason::FrameTooLong;
                }
            };

            debug!("Frame from {}: {frame}", client.id);
            let response = tokio::select! {
                _ = ctx.shutdown.wait() => return CloseReason::Shutdown,
                response = ctx.handler.handle_line(&frame) => response,
            };

            if let Err(error) = write_line(stream, &response).await {
                warn!("Failed to send response to {}: {error}", client.id);
                return CloseReason::Transport;
            }
        }
    }
}

/// Write one frame followed by the delimiter.
pub(crate) async fn write_line(stream: &mut TcpStream, line: &str) -> io::Result<()> {
    let mut framed = Vec::with_capacity(line.len() + 1);
    framed.extend_from_slice(line.as_bytes());
    framed.push(b'\n');
    stream.write_all(&framed).await?;
    stream.flush().await
}
