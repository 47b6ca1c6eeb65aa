//! TCP listener and accept loop.
//!
//! Binds one endpoint, accepts clients and runs a connection loop for each,
//! either concurrently or one at a time.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use actl_protocol::{CommandFailure, Response};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::client::{ClientConnection, ConnectionRegistry};
use crate::connection::{ConnectionContext, serve_connection, write_line};
use crate::errors::TransportError;
use crate::shutdown::ShutdownHandle;

const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Trait implemented by the command router. The transport calls this once
/// per frame and writes back whatever line it returns.
pub trait RequestHandler: Send + Sync + 'static {
    /// Turn one request frame into one response line (without delimiter).
    fn handle_line(&self, frame: &str) -> impl Future<Output = String> + Send;
}

/// How accepted connections are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServeMode {
    /// One loop task per connection, up to `max_connections`.
    #[default]
    Concurrent,
    /// One client at a time; the next is served after the current closes.
    Sequential,
}

impl FromStr for ServeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "concurrent" => Ok(Self::Concurrent),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!("unknown serve mode: {other}")),
        }
    }
}

/// Transport server configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Port to listen on (0 for OS-assigned)
    pub port: u16,
    /// Hostname to bind to
    pub hostname: String,
    pub serve_mode: ServeMode,
    /// Maximum concurrent connections (concurrent mode only)
    pub max_connections: Option<usize>,
    /// Longest accepted frame in bytes, excluding the delimiter
    pub max_frame_len: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: 9000,
            hostname: "127.0.0.1".into(),
            serve_mode: ServeMode::Concurrent,
            max_connections: Some(32),
            max_frame_len: None,
        }
    }
}

/// The transport server: owns the accept loop task.
pub struct TransportServer {
    shutdown: ShutdownHandle,
    handle: Option<JoinHandle<()>>,
    registry: Arc<ConnectionRegistry>,
    local_addr: SocketAddr,
}

impl TransportServer {
    /// Bind and start accepting. Returns once the listener is bound.
    pub async fn start<H: RequestHandler>(
        config: TransportConfig,
        handler: Arc<H>,
    ) -> Result<Self, TransportError> {
        let listener = bind(&config.hostname, config.port).await?;
        let local_addr = listener.local_addr().map_err(TransportError::LocalAddr)?;
        info!(
            "Agentic control listening on {local_addr} ({:?} mode)",
            config.serve_mode
        );

        let shutdown = ShutdownHandle::new();
        let registry = Arc::new(ConnectionRegistry::new());
        let accept_loop = AcceptLoop {
            listener,
            handler,
            registry: registry.clone(),
            config,
            shutdown: shutdown.clone(),
        };
        let handle = tokio::spawn(accept_loop.run());

        Ok(Self {
            shutdown,
            handle: Some(handle),
            registry,
            local_addr,
        })
    }

    /// Get the actual bound port.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn connections(&self) -> Arc<ConnectionRegistry> {
        self.registry.clone()
    }

    /// Stop accepting, close every connection and wait for all loops to exit.
    pub async fn stop(&mut self) {
        self.shutdown.shutdown();
        if let Some(handle) = self.handle.take() {
            if let Err(error) = handle.await {
                warn!("Accept loop ended abnormally: {error}");
            }
            info!("Agentic control transport stopped");
        }
    }
}

impl Drop for TransportServer {
    fn drop(&mut self) {
        self.shutdown.shutdown();
    }
}

async fn bind(host: &str, port: u16) -> Result<TcpListener, TransportError> {
    let resolve_error = |source| TransportError::Resolve {
        host: host.to_string(),
        port,
        source,
    };
    let addr = tokio::net::lookup_host((host, port))
        .await
        .map_err(resolve_error)?
        .next()
        .ok_or_else(|| resolve_error(io::Error::new(io::ErrorKind::NotFound, "no addresses")))?;
    TcpListener::bind(addr)
        .await
        .map_err(|source| TransportError::Bind { addr, source })
}

// ─────────────────────────────────────────────────────────────────────────────
// Accept loop
// ─────────────────────────────────────────────────────────────────────────────

struct AcceptLoop<H> {
    listener: TcpListener,
    handler: Arc<H>,
    registry: Arc<ConnectionRegistry>,
    config: TransportConfig,
    shutdown: ShutdownHandle,
}

impl<H: RequestHandler> AcceptLoop<H> {
    async fn run(self) {
        let mut stop = self.shutdown.signal();
        let mut connections = JoinSet::new();
        let mut last_error = None::<io::ErrorKind>;

        loop {
            let accepted = tokio::select! {
                _ = stop.wait() => break,
                accepted = self.listener.accept() => accepted,
            };
            match accepted {
                Ok((stream, remote_addr)) => {
                    last_error = None;
                    self.dispatch(stream, remote_addr, &mut connections).await;
                }
                Err(error) => {
                    let kind = error.kind();
                    if last_error != Some(kind) {
                        warn!("Socket accept error: {error}");
                    }
                    last_error = Some(kind);
                    tokio::select! {
                        _ = stop.wait() => break,
                        _ = tokio::time::sleep(ERROR_BACKOFF) => {}
                    }
                }
            }
            while connections.try_join_next().is_some() {}
        }

        debug!("Accept loop stopping, waiting for {} connections", connections.len());
        while connections.join_next().await.is_some() {}
    }

    async fn dispatch(
        &self,
        stream: TcpStream,
        remote_addr: SocketAddr,
        connections: &mut JoinSet<()>,
    ) {
        if let Err(error) = stream.set_nodelay(true) {
            debug!("Failed to set TCP_NODELAY for {remote_addr}: {error}");
        }

        match self.config.serve_mode {
            ServeMode::Sequential => {
                let client = ClientConnection::new(remote_addr);
                self.registry.register(client.clone());
                serve_connection(stream, client, self.context()).await;
            }
            ServeMode::Concurrent => {
                if let Some(max) = self.config.max_connections
                    && self.registry.len() >= max
                {
                    warn!("Connection from {remote_addr} rejected: max connections reached ({max})");
                    reject_busy(stream).await;
                    return;
                }
                let client = ClientConnection::new(remote_addr);
                self.registry.register(client.clone());
                let ctx = self.context();
                connections.spawn(async move {
                    serve_connection(stream, client, ctx).await;
                });
            }
        }
    }

    fn context(&self) -> ConnectionContext<H> {
        ConnectionContext {
            handler: self.handler.clone(),
            registry: self.registry.clone(),
            max_frame_len: self.config.max_frame_len,
            shutdown: self.shutdown.signal(),
        }
    }
}

async fn reject_busy(mut stream: TcpStream) {
    let line = Response::from(CommandFailure::Busy).to_line();
    if let Err(error) = write_line(&mut stream, &line).await {
        debug!("Failed to send busy response: {error}");
    }
    let _ = stream.shutdown().await;
}
