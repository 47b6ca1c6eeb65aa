//! Error types for the transport layer.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while starting the listener.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind TCP listener at {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to read listener address: {0}")]
    LocalAddr(#[source] io::Error),
}

/// Errors surfaced by [`crate::LineClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("connection closed by server")]
    Closed,

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}
