//! Error types for the Sentinel plugin.

use sentinel_common::UnsupportedOperation;

/// Error types for gateway calls and skill execution.
///
/// `Api` and `Timeout` display only their detail, since that text is shown
/// verbatim to the agent (e.g. inside heartbeat alerts).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    UnsupportedOperation(#[from] UnsupportedOperation),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    /// The gateway answered with a non-success status.
    #[error("{0}")]
    Api(String),

    #[error("Sentinel API request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Gateway communication error: {0}")]
    Communication(String),

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
