//! Per-call execution context
//!
//! Every Redfish call takes an `AuthContext` explicitly. It carries the
//! optional basic-auth credentials and a cancellation token; cancelling the
//! context aborts whatever call is in flight with `RedfishError::Cancelled`.

use crate::error::RedfishError;
use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Basic-auth credential pair
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Cancellable execution context threaded through every Redfish call
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    credentials: Option<BasicAuth>,
    cancel: CancellationToken,
}

impl AuthContext {
    /// Context without credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Embed a basic-auth credential pair
    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn credentials(&self) -> Option<&BasicAuth> {
        self.credentials.as_ref()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` to completion unless the context is cancelled first
    pub async fn run<T, F>(&self, fut: F) -> Result<T, RedfishError>
    where
        F: Future<Output = Result<T, RedfishError>>,
    {
        if self.is_cancelled() {
            return Err(RedfishError::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(RedfishError::Cancelled),
            result = fut => result,
        }
    }
}
