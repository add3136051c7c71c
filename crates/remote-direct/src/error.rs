//! Remote-direct error types.
//!
//! Construction errors (`MissingConfiguration`, `UrlParse`) are caller input
//! problems. Everything raised by `RemoteDirect::run` names the step that was
//! executing so a half-provisioned node can be diagnosed.

use redfish_client::{BootSourceOverrideTarget, RedfishError};
use std::fmt;
use thiserror::Error;

/// Logical step of the remote-direct workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Look up the ephemeral node's system and resolve its manager
    GetSystem,
    /// Enumerate the manager's virtual media slots
    GetManagerMedia,
    /// Eject media already mounted in the chosen slot
    EjectMedia,
    /// Mount the ISO in the chosen slot
    InsertMedia,
    /// Set the one-time boot source override
    SetBootSource,
    /// Reset the system
    Reset,
}

impl Step {
    /// Stable kebab-case name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::GetSystem => "get-system",
            Step::GetManagerMedia => "get-manager-media",
            Step::EjectMedia => "eject-media",
            Step::InsertMedia => "insert-media",
            Step::SetBootSource => "set-boot-source",
            Step::Reset => "reset",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while building or running a remote-direct boot.
#[derive(Debug, Error)]
pub enum RemoteDirectError {
    /// A required construction parameter is empty
    #[error("missing configuration: {field} is empty")]
    MissingConfiguration {
        /// Name of the offending parameter
        field: &'static str,
    },

    /// The remote endpoint is not a usable http(s) URL
    #[error("invalid remote url '{url}': {reason}")]
    UrlParse {
        /// URL as given by the caller
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The HTTP transport could not be built
    #[error("failed to build redfish transport: {0}")]
    Transport(#[source] RedfishError),

    /// A Redfish call failed
    #[error("{step} failed: {source}")]
    ClientOperationFailed {
        /// Step that issued the call
        step: Step,
        #[source]
        source: RedfishError,
    },

    /// The manager exposes no CD/DVD capable virtual media slot
    #[error("no compatible virtual media (CD/DVD) found on manager {manager_id}")]
    NoCompatibleMediaFound { manager_id: String },

    /// The system does not link to a managing controller
    #[error("system {system_id} lists no ManagedBy controller")]
    NoManagerLink { system_id: String },

    /// A resource reference has no usable final path segment
    #[error("malformed resource reference '{reference}'")]
    MalformedReference { reference: String },

    /// The system does not allow the boot target the inserted media needs
    #[error("system {system_id} does not allow boot source override target {target}")]
    UnsupportedBootSource {
        system_id: String,
        target: BootSourceOverrideTarget,
    },
}

impl RemoteDirectError {
    /// Step that failed, for errors raised by a Redfish call
    pub fn step(&self) -> Option<Step> {
        match self {
            RemoteDirectError::ClientOperationFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Whether the run was aborted by cancelling its context
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            RemoteDirectError::ClientOperationFailed {
                source: RedfishError::Cancelled,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        assert_eq!(Step::GetSystem.to_string(), "get-system");
        assert_eq!(Step::GetManagerMedia.to_string(), "get-manager-media");
        assert_eq!(Step::SetBootSource.to_string(), "set-boot-source");
        assert_eq!(Step::Reset.to_string(), "reset");
    }

    #[test]
    fn test_client_failure_carries_step() {
        let err = RemoteDirectError::ClientOperationFailed {
            step: Step::InsertMedia,
            source: RedfishError::NotFound("VirtualMedia Cd".to_string()),
        };
        assert_eq!(err.step(), Some(Step::InsertMedia));
        assert_eq!(err.to_string(), "insert-media failed: Not found: VirtualMedia Cd");
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_missing_configuration_names_field() {
        let err = RemoteDirectError::MissingConfiguration { field: "iso path" };
        assert_eq!(err.to_string(), "missing configuration: iso path is empty");
        assert_eq!(err.step(), None);
    }
}
