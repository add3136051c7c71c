//! Remote-direct client construction.
//!
//! Validates the caller's parameters and derives the two things every run
//! needs: the execution context (credentials + cancellation) and the HTTP
//! transport settings. Nothing here touches the network.

use crate::error::RemoteDirectError;
use crate::retry::RetryPolicy;
use crate::workflow::RemoteDirect;
use redfish_client::{AuthContext, RedfishClient, TransportConfig};
use std::fmt;
use url::Url;

/// Validated parameters of one remote-direct boot
#[derive(Clone)]
pub struct RemoteDirectConfig {
    remote_url: Url,
    ephemeral_node_id: String,
    iso_path: String,
    username: String,
    password: String,
    insecure_tls: bool,
    use_proxy: bool,
    proxy_url: Option<String>,
}

impl fmt::Debug for RemoteDirectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteDirectConfig")
            .field("remote_url", &self.remote_url.as_str())
            .field("ephemeral_node_id", &self.ephemeral_node_id)
            .field("iso_path", &self.iso_path)
            .field("username", &self.username)
            .field("insecure_tls", &self.insecure_tls)
            .field("use_proxy", &self.use_proxy)
            .field("proxy_url", &self.proxy_url)
            .finish_non_exhaustive()
    }
}

impl RemoteDirectConfig {
    /// Validate construction parameters.
    ///
    /// # Errors
    /// * `MissingConfiguration` - remote URL, node ID or ISO path is empty
    /// * `UrlParse` - the remote URL does not parse, or is not http(s)
    pub fn new(
        remote_url: &str,
        ephemeral_node_id: &str,
        username: &str,
        password: &str,
        iso_path: &str,
        insecure_tls: bool,
        use_proxy: bool,
    ) -> Result<Self, RemoteDirectError> {
        if remote_url.is_empty() {
            return Err(RemoteDirectError::MissingConfiguration { field: "redfish remote url" });
        }
        if ephemeral_node_id.is_empty() {
            return Err(RemoteDirectError::MissingConfiguration { field: "ephemeral node id" });
        }
        if iso_path.is_empty() {
            return Err(RemoteDirectError::MissingConfiguration { field: "iso path" });
        }

        // The URL parser silently drops tabs, newlines and surrounding
        // whitespace, so such input would be rewritten instead of rejected.
        if remote_url.chars().any(char::is_control) || remote_url.trim() != remote_url {
            return Err(RemoteDirectError::UrlParse {
                url: remote_url.to_string(),
                reason: "invalid control character or surrounding whitespace in URL".to_string(),
            });
        }

        let parsed = Url::parse(remote_url).map_err(|e| RemoteDirectError::UrlParse {
            url: remote_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RemoteDirectError::UrlParse {
                url: remote_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            remote_url: parsed,
            ephemeral_node_id: ephemeral_node_id.to_string(),
            iso_path: iso_path.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            insecure_tls,
            use_proxy,
            proxy_url: None,
        })
    }

    /// Route BMC traffic through `proxy_url` instead of the environment proxy.
    /// Has no effect when the proxy is disabled.
    #[must_use]
    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn remote_url(&self) -> &Url {
        &self.remote_url
    }

    pub fn ephemeral_node_id(&self) -> &str {
        &self.ephemeral_node_id
    }

    pub fn iso_path(&self) -> &str {
        &self.iso_path
    }

    /// Fresh execution context; credentials only when both halves are set
    pub fn auth_context(&self) -> AuthContext {
        if !self.username.is_empty() && !self.password.is_empty() {
            AuthContext::new().with_basic_auth(&self.username, &self.password)
        } else {
            AuthContext::new()
        }
    }

    /// Default transport with the TLS and proxy toggles applied
    pub fn transport(&self) -> TransportConfig {
        let transport = TransportConfig::default()
            .with_insecure_tls(self.insecure_tls)
            .with_proxy(self.use_proxy);
        match &self.proxy_url {
            Some(proxy_url) => transport.with_proxy_url(proxy_url.as_str()),
            None => transport,
        }
    }
}

/// Build a remote-direct client from an already validated configuration.
///
/// # Errors
/// Returns `Transport` if the HTTP client cannot be constructed, e.g. for an
/// unusable proxy URL.
pub fn connect(
    config: RemoteDirectConfig,
) -> Result<RemoteDirect<RedfishClient>, RemoteDirectError> {
    let api = RedfishClient::new(config.remote_url().as_str(), config.transport())
        .map_err(RemoteDirectError::Transport)?;
    Ok(RemoteDirect::with_api(config, api).with_retry(RetryPolicy::none()))
}

/// Build a remote-direct client talking to the BMC at `remote_url`.
///
/// # Errors
/// Returns `MissingConfiguration`/`UrlParse` for invalid input and
/// `Transport` if the HTTP client cannot be constructed.
pub fn new_remote_direct_client(
    remote_url: &str,
    ephemeral_node_id: &str,
    username: &str,
    password: &str,
    iso_path: &str,
    insecure_tls: bool,
    use_proxy: bool,
) -> Result<RemoteDirect<RedfishClient>, RemoteDirectError> {
    let config = RemoteDirectConfig::new(
        remote_url,
        ephemeral_node_id,
        username,
        password,
        iso_path,
        insecure_tls,
        use_proxy,
    )?;
    connect(config)
}
