//! Mock RedfishClient for unit testing
//!
//! This module provides a mock implementation of RedfishClientTrait that can be used
//! in unit tests without requiring a BMC.
//!
//! The mock is organized into domain-specific modules:
//! - `systems.rs` - ComputerSystem operations (get, boot override, reset)
//! - `virtual_media.rs` - Manager virtual media operations (list, get, insert, eject)
//! - `helpers.rs` - Helper functions for creating Redfish resources

mod helpers;
mod systems;
mod virtual_media;

pub use helpers::Helpers;

use crate::context::AuthContext;
use crate::error::RedfishError;
use crate::models::*;
use crate::redfish_trait::RedfishClientTrait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Logical operation of the capability interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetSystem,
    GetVirtualMediaCollection,
    GetVirtualMedia,
    InsertMedia,
    EjectMedia,
    SetBootSourceOverride,
    ResetSystem,
}

/// One call observed by the mock, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    GetSystem { system_id: String },
    GetVirtualMediaCollection { manager_id: String },
    GetVirtualMedia { manager_id: String, media_id: String },
    InsertMedia { manager_id: String, media_id: String, image: String },
    EjectMedia { manager_id: String, media_id: String },
    SetBootSourceOverride { system_id: String, target: BootSourceOverrideTarget, enabled: BootSourceOverrideEnabled },
    ResetSystem { system_id: String, reset_type: ResetType },
}

impl RecordedCall {
    pub fn operation(&self) -> Operation {
        match self {
            RecordedCall::GetSystem { .. } => Operation::GetSystem,
            RecordedCall::GetVirtualMediaCollection { .. } => Operation::GetVirtualMediaCollection,
            RecordedCall::GetVirtualMedia { .. } => Operation::GetVirtualMedia,
            RecordedCall::InsertMedia { .. } => Operation::InsertMedia,
            RecordedCall::EjectMedia { .. } => Operation::EjectMedia,
            RecordedCall::SetBootSourceOverride { .. } => Operation::SetBootSourceOverride,
            RecordedCall::ResetSystem { .. } => Operation::ResetSystem,
        }
    }
}

/// Injected failure for one operation
#[derive(Debug, Clone)]
pub(crate) struct Failure {
    /// `None` fails forever, `Some(n)` fails the next n calls
    pub(crate) remaining: Option<usize>,
    pub(crate) status: u16,
}

/// Mock RedfishClient for testing
///
/// This mock stores systems and virtual media slots in memory, records every
/// call, and can be configured to fail or stall specific operations.
#[derive(Debug, Clone)]
pub struct MockRedfishClient {
    pub(crate) base_url: String,
    // In-memory storage for resources
    pub(crate) systems: Arc<Mutex<HashMap<String, ComputerSystem>>>,
    // Slots per manager, in collection order
    pub(crate) virtual_media: Arc<Mutex<HashMap<String, Vec<VirtualMedia>>>>,
    pub(crate) calls: Arc<Mutex<Vec<RecordedCall>>>,
    pub(crate) failures: Arc<Mutex<HashMap<Operation, Failure>>>,
    pub(crate) delays: Arc<Mutex<HashMap<Operation, Duration>>>,
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockRedfishClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            systems: Arc::new(Mutex::new(HashMap::new())),
            virtual_media: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            delays: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Resource builders bound to this mock's base URL
    pub fn helpers(&self) -> Helpers {
        Helpers::new(self.base_url.clone())
    }

    /// Add a system to the mock store (for test setup)
    pub fn add_system(&self, system: ComputerSystem) {
        lock(&self.systems).insert(system.id.clone(), system);
    }

    /// Append a virtual media slot to a manager (for test setup)
    pub fn add_virtual_media(&self, manager_id: impl Into<String>, media: VirtualMedia) {
        lock(&self.virtual_media)
            .entry(manager_id.into())
            .or_default()
            .push(media);
    }

    /// Register a manager with no virtual media slots
    pub fn add_manager(&self, manager_id: impl Into<String>) {
        lock(&self.virtual_media).entry(manager_id.into()).or_default();
    }

    /// Make every call to `operation` fail with an API error of `status`
    pub fn fail_on(&self, operation: Operation, status: u16) {
        lock(&self.failures).insert(operation, Failure { remaining: None, status });
    }

    /// Make the next `count` calls to `operation` fail with an API error of `status`
    pub fn fail_next(&self, operation: Operation, count: usize, status: u16) {
        lock(&self.failures).insert(operation, Failure { remaining: Some(count), status });
    }

    /// Stall `operation` for `delay` before answering
    pub fn delay_on(&self, operation: Operation, delay: Duration) {
        lock(&self.delays).insert(operation, delay);
    }

    /// Every call observed so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Operations observed so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        lock(&self.calls).iter().map(RecordedCall::operation).collect()
    }

    /// Current state of a system
    pub fn system(&self, system_id: &str) -> Option<ComputerSystem> {
        lock(&self.systems).get(system_id).cloned()
    }

    /// Current state of a virtual media slot
    pub fn media(&self, manager_id: &str, media_id: &str) -> Option<VirtualMedia> {
        lock(&self.virtual_media)
            .get(manager_id)
            .and_then(|slots| slots.iter().find(|m| m.id == media_id).cloned())
    }

    /// Record the call, then apply any injected delay or failure
    pub(crate) async fn enter<T, F>(&self, ctx: &AuthContext, call: RecordedCall, op: F) -> Result<T, RedfishError>
    where
        F: Future<Output = Result<T, RedfishError>>,
    {
        let operation = call.operation();
        lock(&self.calls).push(call);

        let delay = lock(&self.delays).get(&operation).copied();
        ctx.run(async {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.injected_failure(operation)?;
            op.await
        })
        .await
    }

    fn injected_failure(&self, operation: Operation) -> Result<(), RedfishError> {
        let mut failures = lock(&self.failures);
        let Some(failure) = failures.get_mut(&operation) else {
            return Ok(());
        };

        let status = failure.status;
        match failure.remaining {
            None => {}
            Some(0) => return Ok(()),
            Some(ref mut n) => *n -= 1,
        }

        Err(RedfishError::Api {
            status,
            message: format!("injected failure for {operation:?}"),
        })
    }
}

#[async_trait::async_trait]
impl RedfishClientTrait for MockRedfishClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    // Systems - delegated to systems module
    async fn get_system(&self, ctx: &AuthContext, system_id: &str) -> Result<ComputerSystem, RedfishError> {
        systems::get_system(self, ctx, system_id).await
    }

    async fn set_boot_source_override(&self, ctx: &AuthContext, system_id: &str, target: BootSourceOverrideTarget, enabled: BootSourceOverrideEnabled) -> Result<(), RedfishError> {
        systems::set_boot_source_override(self, ctx, system_id, target, enabled).await
    }

    async fn reset_system(&self, ctx: &AuthContext, system_id: &str, reset_type: ResetType) -> Result<(), RedfishError> {
        systems::reset_system(self, ctx, system_id, reset_type).await
    }

    // Virtual media - delegated to virtual_media module
    async fn get_virtual_media_collection(&self, ctx: &AuthContext, manager_id: &str) -> Result<Collection, RedfishError> {
        virtual_media::get_virtual_media_collection(self, ctx, manager_id).await
    }

    async fn get_virtual_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<VirtualMedia, RedfishError> {
        virtual_media::get_virtual_media(self, ctx, manager_id, media_id).await
    }

    async fn insert_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str, image: &str) -> Result<(), RedfishError> {
        virtual_media::insert_media(self, ctx, manager_id, media_id, image).await
    }

    async fn eject_media(&self, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<(), RedfishError> {
        virtual_media::eject_media(self, ctx, manager_id, media_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MockRedfishClient {
        let mock = MockRedfishClient::new("http://test-bmc");
        let helpers = mock.helpers();
        mock.add_system(helpers.system("node-1", "bmc-1"));
        mock.add_virtual_media("bmc-1", helpers.virtual_media("bmc-1", "Cd", &[MediaType::Cd, MediaType::Dvd], false));
        mock
    }

    #[tokio::test]
    async fn test_calls_are_recorded_in_order() {
        let mock = seeded();
        let ctx = AuthContext::new();

        mock.get_system(&ctx, "node-1").await.unwrap();
        mock.get_virtual_media_collection(&ctx, "bmc-1").await.unwrap();
        mock.insert_media(&ctx, "bmc-1", "Cd", "http://images/a.iso").await.unwrap();

        assert_eq!(
            mock.operations(),
            vec![Operation::GetSystem, Operation::GetVirtualMediaCollection, Operation::InsertMedia]
        );
    }

    #[tokio::test]
    async fn test_fail_next_recovers() {
        let mock = seeded();
        let ctx = AuthContext::new();
        mock.fail_next(Operation::GetSystem, 1, 503);

        let first = mock.get_system(&ctx, "node-1").await;
        assert!(matches!(first, Err(RedfishError::Api { status: 503, .. })));
        assert!(mock.get_system(&ctx, "node-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_fail_on_is_permanent() {
        let mock = seeded();
        let ctx = AuthContext::new();
        mock.fail_on(Operation::ResetSystem, 500);

        for _ in 0..3 {
            let result = mock.reset_system(&ctx, "node-1", ResetType::ForceRestart).await;
            assert!(matches!(result, Err(RedfishError::Api { status: 500, .. })));
        }
    }

    #[tokio::test]
    async fn test_delay_respects_cancellation() {
        let mock = seeded();
        let ctx = AuthContext::new();
        mock.delay_on(Operation::GetSystem, Duration::from_secs(30));

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = mock.get_system(&ctx, "node-1").await;
        assert!(matches!(result, Err(RedfishError::Cancelled)));
    }
}
