//! Protocol and validation failures.
//!
//! The `Display` text of each variant is exactly the `error` string placed
//! in the response envelope, so clients can match on it.

use thiserror::Error;

/// Failures detected before (or instead of) reaching the owner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandFailure {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Missing command field")]
    MissingCommand,

    #[error("Unknown command")]
    UnknownCommand,

    #[error("Missing params for {0}")]
    MissingParams(String),

    #[error("Missing required param: {0}")]
    MissingParam(String),

    #[error("Invalid param: {0}")]
    InvalidParam(String),

    #[error("Server is shutting down")]
    ShuttingDown,

    #[error("Server busy")]
    Busy,

    #[error("Frame exceeds maximum length")]
    FrameTooLong,
}

impl CommandFailure {
    pub fn missing_params(command: &str) -> Self {
        Self::MissingParams(command.to_string())
    }

    pub fn missing_param(name: &str) -> Self {
        Self::MissingParam(name.to_string())
    }

    pub fn invalid_param(name: &str) -> Self {
        Self::InvalidParam(name.to_string())
    }
}
