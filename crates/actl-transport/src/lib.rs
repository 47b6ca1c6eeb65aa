//! Agentic Control Transport Layer
//!
//! TCP transport for the line protocol. The transport layer handles:
//! - Binding and the accept loop (concurrent or sequential)
//! - One read/route/write loop per connection, with newline framing
//! - Connection tracking and a stop signal that reaches every loop
//!
//! The transport is decoupled from command semantics via the
//! `RequestHandler` trait.

pub mod client;
mod connection;
pub mod errors;
pub mod line_client;
pub mod server;
pub mod shutdown;

pub use client::{ClientConnection, ConnectionRegistry};
pub use errors::{ClientError, TransportError};
pub use line_client::LineClient;
pub use server::{RequestHandler, ServeMode, TransportConfig, TransportServer};
pub use shutdown::ShutdownHandle;
