//! Agentic Control - Protocol Types
//!
//! Line-oriented JSON command protocol. A request is a single-line JSON
//! object `{"command": "...", "params": {...}}`; every response is a
//! single-line `{"success": bool, ...}` envelope. This crate is the single
//! source of truth for envelope shapes, command names, protocol error
//! messages and the newline framing used on the wire.

pub mod commands;
pub mod envelope;
pub mod error;
pub mod framing;

pub use commands::{Commands, CommandName, is_known_command};
pub use envelope::{CommandRequest, Response};
pub use error::CommandFailure;
pub use framing::{FrameDecoder, FrameError, Frames};
