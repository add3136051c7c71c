//! Redfish API client
//!
//! Implements the Redfish REST calls used by remote-direct boot:
//! `/redfish/v1/Systems/{id}` and `/redfish/v1/Managers/{id}/VirtualMedia/...`

use crate::context::AuthContext;
use crate::error::RedfishError;
use crate::models::*;
use crate::redfish_trait::RedfishClientTrait;
use reqwest::{Client, Method, Proxy, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const REDFISH_ROOT: &str = "/redfish/v1";

/// HTTP transport settings for talking to a BMC
///
/// `TransportConfig::default()` is the standard transport: sane timeouts and
/// keep-alive, certificates verified, proxy taken from the environment.
/// Callers start from the default and flip only the knobs they need.
///
/// With `use_proxy` off no proxy is used at all, not even `proxy_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub accept_invalid_certs: bool,
    pub use_proxy: bool,
    /// Explicit proxy for every request, in place of the environment's
    pub proxy_url: Option<String>,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            accept_invalid_certs: false,
            use_proxy: true,
            proxy_url: None,
            user_agent: concat!("remote-direct/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportConfig {
    /// Skip TLS certificate verification (self-signed BMC certificates)
    #[must_use]
    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        self.accept_invalid_certs = insecure;
        self
    }

    /// Honour (`true`) or ignore (`false`) proxy environment variables
    #[must_use]
    pub fn with_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    /// Send every request through `proxy_url` instead of the environment proxy
    #[must_use]
    pub fn with_proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy_url.into());
        self
    }

    /// Build the reqwest client for these settings
    pub fn build(&self) -> Result<Client, RedfishError> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .user_agent(self.user_agent.clone());

        if self.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if !self.use_proxy {
            builder = builder.no_proxy();
        } else if let Some(proxy_url) = &self.proxy_url {
            builder = builder.proxy(Proxy::all(proxy_url.as_str())?);
        }

        builder.build().map_err(RedfishError::Http)
    }
}

/// Redfish API client
#[derive(Debug, Clone)]
pub struct RedfishClient {
    client: Client,
    base_url: String,
    transport: TransportConfig,
}

impl RedfishClient {
    /// Create a new Redfish client
    ///
    /// # Arguments
    /// * `base_url` - BMC root URL (e.g., "https://10.0.0.10")
    /// * `transport` - Transport settings; no request is sent here
    pub fn new(base_url: impl Into<String>, transport: TransportConfig) -> Result<Self, RedfishError> {
        let client = transport.build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Transport settings the client was built with
    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    fn url(&self, segments: &[&str]) -> Result<String, RedfishError> {
        let mut url = format!("{}{}", self.base_url, REDFISH_ROOT);
        for segment in segments {
            if segment.is_empty() || segment.contains(['/', '?', '#']) {
                return Err(RedfishError::InvalidRequest(format!(
                    "invalid resource path segment '{segment}'"
                )));
            }
            url.push('/');
            url.push_str(segment);
        }
        Ok(url)
    }

    fn request(&self, ctx: &AuthContext, method: Method, url: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        if let Some(auth) = ctx.credentials() {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }
        request
    }

    /// Turn non-success statuses into typed errors
    async fn check(response: Response, what: &str) -> Result<Response, RedfishError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(RedfishError::Authentication(format!("{what}: {status}"))),
            404 => Err(RedfishError::NotFound(what.to_string())),
            code => Err(RedfishError::Api {
                status: code,
                message: format!("{what}: {body}"),
            }),
        }
    }

    async fn get<T: DeserializeOwned>(&self, ctx: &AuthContext, segments: &[&str]) -> Result<T, RedfishError> {
        let url = self.url(segments)?;
        debug!("GET {}", url);

        ctx.run(async {
            let response = self.request(ctx, Method::GET, &url).send().await?;
            let response = Self::check(response, &url).await?;
            let status = response.status().as_u16();

            let text = response.text().await?;
            serde_json::from_str(&text).map_err(|e| RedfishError::Api {
                status,
                message: format!(
                    "error decoding response body: {} - Response (first 500 chars): {}",
                    e,
                    text.chars().take(500).collect::<String>()
                ),
            })
        })
        .await
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        ctx: &AuthContext,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<(), RedfishError> {
        let url = self.url(segments)?;
        debug!("{} {}", method, url);

        ctx.run(async {
            let response = self.request(ctx, method.clone(), &url).json(body).send().await?;
            Self::check(response, &url).await?;
            Ok(())
        })
        .await
    }

    /// Get a computer system by ID
    pub async fn get_system(&self, ctx: &AuthContext, system_id: &str) -> Result<ComputerSystem, RedfishError> {
        self.get(ctx, &["Systems", system_id]).await
    }

    /// Set the boot source override of a system
    pub async fn set_boot_source_override(
        &self,
        ctx: &AuthContext,
        system_id: &str,
        target: BootSourceOverrideTarget,
        enabled: BootSourceOverrideEnabled,
    ) -> Result<(), RedfishError> {
        let patch = SystemBootPatch::new(target, enabled);
        self.send_json(ctx, Method::PATCH, &["Systems", system_id], &patch).await
    }

    /// Post a `ComputerSystem.Reset` action. Returns once the BMC accepts it.
    pub async fn reset_system(&self, ctx: &AuthContext, system_id: &str, reset_type: ResetType) -> Result<(), RedfishError> {
        let body = ResetRequest { reset_type };
        self.send_json(
            ctx,
            Method::POST,
            &["Systems", system_id, "Actions", "ComputerSystem.Reset"],
            &body,
        )
        .await
    }

    /// List a manager's virtual media slots
    pub async fn get_virtual_media_collection(&self, ctx: &AuthContext, manager_id: &str) -> Result<Collection, RedfishError> {
        self.get(ctx, &["Managers", manager_id, "VirtualMedia"]).await
    }

    /// Get one virtual media slot
    pub async fn get_virtual_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<VirtualMedia, RedfishError> {
        self.get(ctx, &["Managers", manager_id, "VirtualMedia", media_id]).await
    }

    /// Mount `image` into a virtual media slot
    pub async fn insert_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str, image: &str) -> Result<(), RedfishError> {
        let body = InsertMediaRequest::new(image);
        self.send_json(
            ctx,
            Method::POST,
            &["Managers", manager_id, "VirtualMedia", media_id, "Actions", "VirtualMedia.InsertMedia"],
            &body,
        )
        .await
    }

    /// Unmount whatever is in a virtual media slot
    pub async fn eject_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<(), RedfishError> {
        self.send_json(
            ctx,
            Method::POST,
            &["Managers", manager_id, "VirtualMedia", media_id, "Actions", "VirtualMedia.EjectMedia"],
            &serde_json::json!({}),
        )
        .await
    }
}

#[async_trait::async_trait]
impl RedfishClientTrait for RedfishClient {
    fn base_url(&self) -> &str {
        self.base_url()
    }

    async fn get_system(&self, ctx: &AuthContext, system_id: &str) -> Result<ComputerSystem, RedfishError> {
        self.get_system(ctx, system_id).await
    }

    async fn set_boot_source_override(&self, ctx: &AuthContext, system_id: &str, target: BootSourceOverrideTarget, enabled: BootSourceOverrideEnabled) -> Result<(), RedfishError> {
        self.set_boot_source_override(ctx, system_id, target, enabled).await
    }

    async fn reset_system(&self, ctx: &AuthContext, system_id: &str, reset_type: ResetType) -> Result<(), RedfishError> {
        self.reset_system(ctx, system_id, reset_type).await
    }

    async fn get_virtual_media_collection(&self, ctx: &AuthContext, manager_id: &str) -> Result<Collection, RedfishError> {
        self.get_virtual_media_collection(ctx, manager_id).await
    }

    async fn get_virtual_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<VirtualMedia, RedfishError> {
        self.get_virtual_media(ctx, manager_id, media_id).await
    }

    async fn insert_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str, image: &str) -> Result<(), RedfishError> {
        self.insert_media(ctx, manager_id, media_id, image).await
    }

    async fn eject_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<(), RedfishError> {
        self.eject_media(ctx, manager_id, media_id).await
    }
}
