//! Manager virtual media operations for MockRedfishClient

use super::{MockRedfishClient, RecordedCall, lock};
use crate::context::AuthContext;
use crate::error::RedfishError;
use crate::models::*;

fn slot_mut<'a>(slots: &'a mut [VirtualMedia], manager_id: &str, media_id: &str) -> Result<&'a mut VirtualMedia, RedfishError> {
    slots
        .iter_mut()
        .find(|m| m.id == media_id)
        .ok_or_else(|| RedfishError::NotFound(format!("VirtualMedia {media_id} on manager {manager_id} not found")))
}

pub async fn get_virtual_media_collection(client: &MockRedfishClient, ctx: &AuthContext, manager_id: &str) -> Result<Collection, RedfishError> {
    let call = RecordedCall::GetVirtualMediaCollection { manager_id: manager_id.to_string() };
    client
        .enter(ctx, call, async {
            let store = lock(&client.virtual_media);
            let slots = store
                .get(manager_id)
                .ok_or_else(|| RedfishError::NotFound(format!("Manager {manager_id} not found")))?;

            let helpers = client.helpers();
            let members: Vec<ODataId> = slots
                .iter()
                .map(|m| ODataId::new(helpers.virtual_media_path(manager_id, &m.id)))
                .collect();
            Ok(Collection {
                members_count: Some(members.len() as u64),
                members,
            })
        })
        .await
}

pub async fn get_virtual_media(client: &MockRedfishClient, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<VirtualMedia, RedfishError> {
    let call = RecordedCall::GetVirtualMedia {
        manager_id: manager_id.to_string(),
        media_id: media_id.to_string(),
    };
    client
        .enter(ctx, call, async {
            let mut store = lock(&client.virtual_media);
            let slots = store
                .get_mut(manager_id)
                .ok_or_else(|| RedfishError::NotFound(format!("Manager {manager_id} not found")))?;
            slot_mut(slots, manager_id, media_id).map(|m| m.clone())
        })
        .await
}

pub async fn insert_media(client: &MockRedfishClient, ctx: &AuthContext, manager_id: &str, media_id: &str, image: &str) -> Result<(), RedfishError> {
    let call = RecordedCall::InsertMedia {
        manager_id: manager_id.to_string(),
        media_id: media_id.to_string(),
        image: image.to_string(),
    };
    client
        .enter(ctx, call, async {
            let mut store = lock(&client.virtual_media);
            let slots = store
                .get_mut(manager_id)
                .ok_or_else(|| RedfishError::NotFound(format!("Manager {manager_id} not found")))?;
            let slot = slot_mut(slots, manager_id, media_id)?;

            // BMCs refuse to mount over an occupied slot
            if slot.is_inserted() {
                return Err(RedfishError::Api {
                    status: 409,
                    message: format!("VirtualMedia {media_id} already has media inserted"),
                });
            }
            slot.inserted = Some(true);
            slot.image = Some(image.to_string());
            slot.write_protected = Some(true);
            Ok(())
        })
        .await
}

pub async fn eject_media(client: &MockRedfishClient, ctx: &AuthContext, manager_id: &str, media_id: &str) -> Result<(), RedfishError> {
    let call = RecordedCall::EjectMedia {
        manager_id: manager_id.to_string(),
        media_id: media_id.to_string(),
    };
    client
        .enter(ctx, call, async {
            let mut store = lock(&client.virtual_media);
            let slots = store
                .get_mut(manager_id)
                .ok_or_else(|| RedfishError::NotFound(format!("Manager {manager_id} not found")))?;
            let slot = slot_mut(slots, manager_id, media_id)?;
            slot.inserted = Some(false);
            slot.image = None;
            Ok(())
        })
        .await
}
