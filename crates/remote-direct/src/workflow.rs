//! Remote-direct boot workflow.
//!
//! One run drives a single node through:
//! 1. look up the system and resolve its manager
//! 2. pick the first CD/DVD virtual media slot on that manager
//! 3. eject whatever is mounted there, then insert the ISO
//! 4. set a one-time boot override matching the slot's media type
//! 5. reset the system
//!
//! Steps are strictly sequential and fail-fast. Nothing is rolled back: a
//! failure after step 3 leaves the ISO mounted. Success means the BMC accepted
//! every request, not that the node has booted.

use crate::config::RemoteDirectConfig;
use crate::error::{RemoteDirectError, Step};
use crate::extract::resource_id;
use crate::retry::RetryPolicy;
use redfish_client::{
    AuthContext, BootSourceOverrideEnabled, BootSourceOverrideTarget, ComputerSystem, MediaType,
    RedfishClientTrait, RedfishError, ResetType,
};
use std::fmt;
use std::future::Future;
use tracing::{debug, info, warn};

/// Progress of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing sent yet
    Init,
    /// System resource retrieved
    SystemFetched,
    /// Manager ID taken from the system's `ManagedBy` link
    ManagerResolved,
    /// CD/DVD slot chosen
    MediaSlotSelected,
    /// ISO mounted
    MediaInserted,
    /// One-time boot override accepted
    BootSourceSet,
    /// Reset accepted
    Reset,
    /// Run finished
    Done,
    /// Absorbing: no transition leaves it
    Failed(Step),
}

impl Phase {
    /// Successor on the success path
    pub fn next(self) -> Phase {
        match self {
            Phase::Init => Phase::SystemFetched,
            Phase::SystemFetched => Phase::ManagerResolved,
            Phase::ManagerResolved => Phase::MediaSlotSelected,
            Phase::MediaSlotSelected => Phase::MediaInserted,
            Phase::MediaInserted => Phase::BootSourceSet,
            Phase::BootSourceSet => Phase::Reset,
            Phase::Reset | Phase::Done => Phase::Done,
            Phase::Failed(step) => Phase::Failed(step),
        }
    }

    /// Step whose success moves the run out of this phase.
    ///
    /// Resolving the manager works on the get-system response, so it belongs
    /// to that step.
    pub fn pending_step(self) -> Option<Step> {
        match self {
            Phase::Init | Phase::SystemFetched => Some(Step::GetSystem),
            Phase::ManagerResolved => Some(Step::GetManagerMedia),
            Phase::MediaSlotSelected => Some(Step::InsertMedia),
            Phase::MediaInserted => Some(Step::SetBootSource),
            Phase::BootSourceSet => Some(Step::Reset),
            Phase::Reset | Phase::Done | Phase::Failed(_) => None,
        }
    }

    /// Move to `Failed`, unless already failed
    pub fn fail(self, step: Step) -> Phase {
        match self {
            Phase::Failed(first) => Phase::Failed(first),
            _ => Phase::Failed(step),
        }
    }

    /// Phase a run ends in when `err` stops it here
    pub fn on_error(self, err: &RemoteDirectError) -> Phase {
        match err.step().or(self.pending_step()) {
            Some(step) => self.fail(step),
            None => self,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed(_))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Failed(step) => write!(f, "Failed({step})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// What a successful run touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// System that was reset
    pub system_id: String,
    /// Manager owning the virtual media slot
    pub manager_id: String,
    /// Slot the ISO was mounted in
    pub media_id: String,
    /// Optical media type the slot matched on
    pub media_type: MediaType,
    /// One-time boot override that was set
    pub boot_target: BootSourceOverrideTarget,
    /// Whether previously mounted media had to be ejected first
    pub ejected_previous: bool,
    /// Reset issued in the final step
    pub reset_type: ResetType,
}

/// Selected virtual media slot
struct MediaSlot {
    id: String,
    media_type: MediaType,
    inserted: bool,
}

/// Remote-direct client: configuration, execution context and Redfish API
pub struct RemoteDirect<C> {
    config: RemoteDirectConfig,
    ctx: AuthContext,
    api: C,
    retry: RetryPolicy,
    reset_type: ResetType,
}

impl<C> fmt::Debug for RemoteDirect<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteDirect")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .field("reset_type", &self.reset_type)
            .finish_non_exhaustive()
    }
}

impl<C: RedfishClientTrait> RemoteDirect<C> {
    /// Pair a validated configuration with any Redfish implementation
    pub fn with_api(config: RemoteDirectConfig, api: C) -> Self {
        let ctx = config.auth_context();
        Self {
            config,
            ctx,
            api,
            retry: RetryPolicy::default(),
            reset_type: ResetType::ForceRestart,
        }
    }

    /// Retry policy for discovery calls
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Reset type used in the final step (default `ForceRestart`)
    #[must_use]
    pub fn with_reset_type(mut self, reset_type: ResetType) -> Self {
        self.reset_type = reset_type;
        self
    }

    /// Validated parameters of this client
    pub fn config(&self) -> &RemoteDirectConfig {
        &self.config
    }

    /// Underlying Redfish implementation
    pub fn api(&self) -> &C {
        &self.api
    }

    /// Execution context shared by every call; cancel it to abort a run
    pub fn context(&self) -> &AuthContext {
        &self.ctx
    }

    /// Boot the ephemeral node from the configured ISO.
    ///
    /// # Errors
    /// The first failure aborts the run; see `RemoteDirectError`.
    pub async fn run(&self) -> Result<RunReport, RemoteDirectError> {
        info!(
            "Starting remote-direct boot of node {} from {}",
            self.config.ephemeral_node_id(),
            self.config.iso_path()
        );
        debug!("Using Redfish endpoint: {}", self.api.base_url());

        let mut phase = Phase::Init;
        let result = self.execute(&mut phase).await;
        match result {
            Ok(report) => {
                phase = phase.next();
                debug!("Remote-direct phase: {}", phase);
                info!(
                    "Node {} reset via manager {} with {} in virtual media {}",
                    report.system_id, report.manager_id, self.config.iso_path(), report.media_id
                );
                Ok(report)
            }
            Err(err) => {
                phase = phase.on_error(&err);
                warn!("Remote-direct boot stopped in phase {}: {}", phase, err);
                Err(err)
            }
        }
    }

    async fn execute(&self, phase: &mut Phase) -> Result<RunReport, RemoteDirectError> {
        let system_id = self.config.ephemeral_node_id();

        // 1. system and its manager
        let system = self
            .discover(Step::GetSystem, || self.api.get_system(&self.ctx, system_id))
            .await?;
        advance(phase);
        debug!("Ephemeral node system ID: {}", system.id);

        let manager_ref = system
            .manager_reference()
            .ok_or_else(|| RemoteDirectError::NoManagerLink {
                system_id: system_id.to_string(),
            })?;
        let manager_id = resource_id(manager_ref)?;
        advance(phase);
        debug!("Ephemeral node manager ID: {}", manager_id);

        // 2. first CD/DVD slot
        let slot = self.select_media_slot(manager_id).await?;
        advance(phase);
        debug!("Ephemeral node virtual media ID: {} ({})", slot.id, slot.media_type);

        // 3. mount the ISO
        if slot.inserted {
            debug!("Virtual media {} already has media inserted, ejecting", slot.id);
            self.api
                .eject_media(&self.ctx, manager_id, &slot.id)
                .await
                .map_err(|source| RemoteDirectError::ClientOperationFailed {
                    step: Step::EjectMedia,
                    source,
                })?;
        }
        self.api
            .insert_media(&self.ctx, manager_id, &slot.id, self.config.iso_path())
            .await
            .map_err(|source| RemoteDirectError::ClientOperationFailed {
                step: Step::InsertMedia,
                source,
            })?;
        advance(phase);
        debug!("Successfully loaded virtual media: {}", self.config.iso_path());

        // 4. one-time boot from that media
        let target = boot_target_for(&system, slot.media_type)?;
        self.api
            .set_boot_source_override(&self.ctx, system_id, target, BootSourceOverrideEnabled::Once)
            .await
            .map_err(|source| RemoteDirectError::ClientOperationFailed {
                step: Step::SetBootSource,
                source,
            })?;
        advance(phase);
        debug!("Set one-time boot source override to {}", target);

        // 5. reset
        self.api
            .reset_system(&self.ctx, system_id, self.reset_type)
            .await
            .map_err(|source| RemoteDirectError::ClientOperationFailed {
                step: Step::Reset,
                source,
            })?;
        advance(phase);
        debug!("Restarted ephemeral host ({})", self.reset_type);

        Ok(RunReport {
            system_id: system_id.to_string(),
            manager_id: manager_id.to_string(),
            media_id: slot.id,
            media_type: slot.media_type,
            boot_target: target,
            ejected_previous: slot.inserted,
            reset_type: self.reset_type,
        })
    }

    async fn select_media_slot(&self, manager_id: &str) -> Result<MediaSlot, RemoteDirectError> {
        let collection = self
            .discover(Step::GetManagerMedia, || {
                self.api.get_virtual_media_collection(&self.ctx, manager_id)
            })
            .await?;

        for member in &collection.members {
            let media_id = resource_id(&member.odata_id)?;
            let media = self
                .discover(Step::GetManagerMedia, || {
                    self.api.get_virtual_media(&self.ctx, manager_id, media_id)
                })
                .await?;

            if let Some(media_type) = media.optical_media_type() {
                return Ok(MediaSlot {
                    id: media_id.to_string(),
                    media_type,
                    inserted: media.is_inserted(),
                });
            }
            debug!("Virtual media {} supports {:?}, skipping", media_id, media.media_types);
        }

        Err(RemoteDirectError::NoCompatibleMediaFound {
            manager_id: manager_id.to_string(),
        })
    }

    /// Run a read-only call under the retry policy
    async fn discover<T, F, Fut>(&self, step: Step, mut call: F) -> Result<T, RemoteDirectError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RedfishError>>,
    {
        let attempts = self.retry.effective_attempts();
        let mut backoff = self.retry.backoff();
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && err.is_transient() => {
                    let delay = backoff.next_backoff();
                    warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        step, attempt, attempts, err, delay
                    );
                    self.ctx
                        .run(async {
                            tokio::time::sleep(delay).await;
                            Ok(())
                        })
                        .await
                        .map_err(|source| RemoteDirectError::ClientOperationFailed {
                            step,
                            source,
                        })?;
                    attempt += 1;
                }
                Err(source) => {
                    return Err(RemoteDirectError::ClientOperationFailed { step, source });
                }
            }
        }
    }
}

fn advance(phase: &mut Phase) {
    *phase = phase.next();
    debug!("Remote-direct phase: {}", phase);
}

/// Override target for the inserted media, checked against what the system allows
fn boot_target_for(
    system: &ComputerSystem,
    media_type: MediaType,
) -> Result<BootSourceOverrideTarget, RemoteDirectError> {
    let unsupported = |target| RemoteDirectError::UnsupportedBootSource {
        system_id: system.id.clone(),
        target,
    };

    let target = media_type
        .boot_target()
        .ok_or_else(|| unsupported(BootSourceOverrideTarget::Other))?;

    let allowed = system
        .boot
        .as_ref()
        .map(|boot| boot.allowable_targets.as_slice())
        .unwrap_or_default();
    if !allowed.is_empty() && !allowed.contains(&target) {
        return Err(unsupported(target));
    }
    Ok(target)
}
