//! ComputerSystem operations for MockRedfishClient

use super::{MockRedfishClient, RecordedCall, lock};
use crate::context::AuthContext;
use crate::error::RedfishError;
use crate::models::*;

pub async fn get_system(client: &MockRedfishClient, ctx: &AuthContext, system_id: &str) -> Result<ComputerSystem, RedfishError> {
    let call = RecordedCall::GetSystem { system_id: system_id.to_string() };
    client
        .enter(ctx, call, async {
            lock(&client.systems)
                .get(system_id)
                .cloned()
                .ok_or_else(|| RedfishError::NotFound(format!("System {system_id} not found")))
        })
        .await
}

pub async fn set_boot_source_override(
    client: &MockRedfishClient,
    ctx: &AuthContext,
    system_id: &str,
    target: BootSourceOverrideTarget,
    enabled: BootSourceOverrideEnabled,
) -> Result<(), RedfishError> {
    let call = RecordedCall::SetBootSourceOverride {
        system_id: system_id.to_string(),
        target,
        enabled,
    };
    client
        .enter(ctx, call, async {
            let mut systems = lock(&client.systems);
            let system = systems
                .get_mut(system_id)
                .ok_or_else(|| RedfishError::NotFound(format!("System {system_id} not found")))?;

            let boot = system.boot.get_or_insert_with(Boot::default);
            if !boot.allowable_targets.is_empty() && !boot.allowable_targets.contains(&target) {
                return Err(RedfishError::Api {
                    status: 400,
                    message: format!("BootSourceOverrideTarget {target} not allowed"),
                });
            }
            boot.boot_source_override_target = Some(target);
            boot.boot_source_override_enabled = Some(enabled);
            Ok(())
        })
        .await
}

pub async fn reset_system(client: &MockRedfishClient, ctx: &AuthContext, system_id: &str, reset_type: ResetType) -> Result<(), RedfishError> {
    let call = RecordedCall::ResetSystem {
        system_id: system_id.to_string(),
        reset_type,
    };
    client
        .enter(ctx, call, async {
            let mut systems = lock(&client.systems);
            let system = systems
                .get_mut(system_id)
                .ok_or_else(|| RedfishError::NotFound(format!("System {system_id} not found")))?;

            system.power_state = Some(match reset_type {
                ResetType::ForceOff | ResetType::GracefulShutdown => PowerState::Off,
                _ => PowerState::On,
            });
            Ok(())
        })
        .await
}
