//! RedfishClient trait for mocking
//!
//! This trait is the set of Redfish operations the remote-direct workflow
//! depends on. The concrete `RedfishClient` implements it over HTTP, and tests
//! use `MockRedfishClient`.

use crate::context::AuthContext;
use crate::error::RedfishError;
use crate::models::*;

/// Trait for Redfish API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
/// Every call takes the execution context explicitly; implementations must
/// honour its credentials and cancellation.
#[async_trait::async_trait]
pub trait RedfishClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    // Systems
    async fn get_system(&self, ctx: &AuthContext, system_id: &str) -> Result<ComputerSystem, RedfishError>;
    async fn set_boot_source_override(&self, ctx: &AuthContext, system_id: &str, target: BootSourceOverrideTarget, enabled: BootSourceOverrideEnabled) -> Result<(), RedfishError>;
    async fn reset_system(&self, ctx: &AuthContext, system_id: &str, reset_type: ResetType) -> Result<(), RedfishError>;

    // Manager virtual media
    async fn get_virtual_media_collection(&self, ctx: &AuthContext, manager_id: &str) -> Result<Collection, RedfishError>;
    async fn get_virtual_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<VirtualMedia, RedfishError>;
    async fn insert_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str, image: &str) -> Result<(), RedfishError>;
    async fn eject_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<(), RedfishError>;
}
