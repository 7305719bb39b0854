use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// Error returned by every client facade operation.
///
/// Facade operations never panic and never propagate lower-layer failures
/// in any other shape than [`ClientError::LowLevel`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// An argument failed validation before any state was touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The connection configuration could not be parsed or resolved.
    #[error("invalid client configuration")]
    Config(#[from] ConfigError),
    /// The background dispatch worker could not be started.
    #[error("failed to start the dispatch worker")]
    WorkerStart,
    /// A detached worker task could not be spawned.
    #[error("failed to spawn a detached worker task")]
    TaskSpawn(#[source] io::Error),
    /// The operation is not provided by the connected transport.
    #[error("operation not supported by this transport: {0}")]
    Unsupported(&'static str),
    /// The lower layer reported a failure.
    #[error(transparent)]
    LowLevel(#[from] LowLevelError),
}

/// Error reported by a lower-layer transport engine.
#[derive(Debug, Error)]
pub enum LowLevelError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("transport is busy")]
    Busy,
    #[error("unsupported by this transport: {0}")]
    Unsupported(&'static str),
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}
