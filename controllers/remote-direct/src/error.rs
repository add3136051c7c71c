//! Controller-specific error types.
//!
//! This module defines error types specific to the remote-direct binary
//! that are not covered by the library errors.

use remote_direct::RemoteDirectError;
use thiserror::Error;

/// Errors that can occur in the remote-direct binary.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Remote-direct boot failed
    #[error("Remote-direct boot failed: {0}")]
    RemoteDirect(#[from] RemoteDirectError),
}
