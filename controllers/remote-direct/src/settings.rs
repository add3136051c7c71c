//! Environment configuration for the remote-direct binary.

use crate::error::ControllerError;
use remote_direct::RetryPolicy;

/// Settings read from the environment
#[derive(Clone)]
pub struct Settings {
    pub redfish_url: String,
    pub ephemeral_node_id: String,
    pub iso_path: String,
    pub username: String,
    pub password: String,
    pub insecure: bool,
    pub use_proxy: bool,
    /// Explicit proxy, overriding the proxy environment variables
    pub proxy_url: Option<String>,
    pub discovery_attempts: u32,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("redfish_url", &self.redfish_url)
            .field("ephemeral_node_id", &self.ephemeral_node_id)
            .field("iso_path", &self.iso_path)
            .field("username", &self.username)
            .field("insecure", &self.insecure)
            .field("use_proxy", &self.use_proxy)
            .field("proxy_url", &self.proxy_url)
            .field("discovery_attempts", &self.discovery_attempts)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load settings from process environment variables
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through `lookup`; unset and empty values are the same
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                ControllerError::InvalidConfig(format!("{key} environment variable is required"))
            })
        };

        Ok(Self {
            redfish_url: required("REDFISH_URL")?,
            ephemeral_node_id: required("EPHEMERAL_NODE_ID")?,
            iso_path: required("ISO_PATH")?,
            username: get("REDFISH_USERNAME").unwrap_or_default(),
            password: get("REDFISH_PASSWORD").unwrap_or_default(),
            insecure: parse_bool("REDFISH_INSECURE", get("REDFISH_INSECURE"), false)?,
            use_proxy: parse_bool("REDFISH_USE_PROXY", get("REDFISH_USE_PROXY"), true)?,
            proxy_url: get("REDFISH_PROXY_URL"),
            discovery_attempts: match get("REDFISH_DISCOVERY_RETRIES") {
                None => 1,
                Some(raw) => raw.parse::<u32>().ok().filter(|n| *n >= 1).ok_or_else(|| {
                    ControllerError::InvalidConfig(format!(
                        "REDFISH_DISCOVERY_RETRIES must be a positive integer, got '{raw}'"
                    ))
                })?,
            },
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::attempts(self.discovery_attempts)
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, ControllerError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ControllerError::InvalidConfig(format!(
            "{key} must be true or false, got '{raw}'"
        ))),
    }
}
