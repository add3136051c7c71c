//! Helper functions for creating Redfish resources in tests

use crate::models::*;

/// Builds Redfish resources whose `@odata.id` links match the mock's layout
#[derive(Debug, Clone)]
pub struct Helpers {
    base_url: String,
}

impl Helpers {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn system_path(&self, system_id: &str) -> String {
        format!("/redfish/v1/Systems/{system_id}")
    }

    pub fn manager_path(&self, manager_id: &str) -> String {
        format!("/redfish/v1/Managers/{manager_id}")
    }

    pub fn virtual_media_path(&self, manager_id: &str, media_id: &str) -> String {
        format!("/redfish/v1/Managers/{manager_id}/VirtualMedia/{media_id}")
    }

    /// A powered-off system managed by `manager_id`
    pub fn system(&self, system_id: &str, manager_id: &str) -> ComputerSystem {
        ComputerSystem {
            odata_id: self.system_path(system_id),
            id: system_id.to_string(),
            name: Some(format!("System {system_id}")),
            power_state: Some(PowerState::Off),
            links: SystemLinks {
                managed_by: vec![ODataId::new(self.manager_path(manager_id))],
            },
            boot: Some(Boot::default()),
        }
    }

    /// A virtual media slot on `manager_id`
    pub fn virtual_media(&self, manager_id: &str, media_id: &str, media_types: &[MediaType], inserted: bool) -> VirtualMedia {
        VirtualMedia {
            odata_id: self.virtual_media_path(manager_id, media_id),
            id: media_id.to_string(),
            name: Some(format!("Virtual {media_id}")),
            media_types: media_types.to_vec(),
            inserted: Some(inserted),
            image: inserted.then(|| "http://images/previous.iso".to_string()),
            write_protected: Some(true),
        }
    }
}
