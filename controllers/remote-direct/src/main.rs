//! Remote-direct boot
//!
//! Boots one ephemeral node from an installer ISO through its BMC:
//! mount the ISO as virtual media, set a one-time boot override, reset.
//!
//! Configuration comes from the environment (see `settings.rs`). Ctrl-C
//! cancels the in-flight Redfish call and exits with an error.

mod error;
mod settings;

use crate::error::ControllerError;
use remote_direct::{RemoteDirectConfig, connect};
use settings::Settings;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Redfish remote-direct boot");

    let settings = Settings::from_env()?;
    info!("Configuration:");
    info!("  Redfish URL: {}", settings.redfish_url);
    info!("  Ephemeral node: {}", settings.ephemeral_node_id);
    info!("  ISO: {}", settings.iso_path);
    info!("  Insecure TLS: {}, use proxy: {}", settings.insecure, settings.use_proxy);
    if let Some(proxy_url) = &settings.proxy_url {
        info!("  Proxy: {}", proxy_url);
    }

    let mut config = RemoteDirectConfig::new(
        &settings.redfish_url,
        &settings.ephemeral_node_id,
        &settings.username,
        &settings.password,
        &settings.iso_path,
        settings.insecure,
        settings.use_proxy,
    )
    .map_err(ControllerError::from)?;
    if let Some(proxy_url) = &settings.proxy_url {
        config = config.with_proxy_url(proxy_url.as_str());
    }
    let client = connect(config)
        .map_err(ControllerError::from)?
        .with_retry(settings.retry_policy());

    let ctx = client.context().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remote-direct boot");
            ctx.cancel();
        }
    });

    match client.run().await {
        Ok(report) => {
            info!(
                "Node {} is rebooting from {} ({} slot {}, boot target {})",
                report.system_id,
                settings.iso_path,
                report.media_type,
                report.media_id,
                report.boot_target
            );
            Ok(())
        }
        Err(err) => {
            error!("{}", err);
            Err(ControllerError::from(err).into())
        }
    }
}
