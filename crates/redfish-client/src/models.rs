//! Redfish API models
//!
//! These models match the DMTF Redfish schema for the handful of resources the
//! remote-direct boot path touches: ComputerSystem, Manager virtual media and
//! the ComputerSystem.Reset action.
//! See: DSP0268 (Redfish Resource and Schema Guide)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to another resource (`{"@odata.id": "/redfish/v1/..."}`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ODataId {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

impl ODataId {
    pub fn new(odata_id: impl Into<String>) -> Self {
        Self {
            odata_id: odata_id.into(),
        }
    }
}

/// Resource collection (e.g. `Managers/{id}/VirtualMedia`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Collection {
    #[serde(rename = "Members", default)]
    pub members: Vec<ODataId>,
    #[serde(rename = "Members@odata.count", default, skip_serializing_if = "Option::is_none")]
    pub members_count: Option<u64>,
}

/// ComputerSystem resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    #[serde(rename = "@odata.id", default)]
    pub odata_id: String,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub power_state: Option<PowerState>,
    #[serde(default)]
    pub links: SystemLinks,
    #[serde(default)]
    pub boot: Option<Boot>,
}

impl ComputerSystem {
    /// The first manager listed under `Links.ManagedBy`
    pub fn manager_reference(&self) -> Option<&str> {
        self.links.managed_by.first().map(|link| link.odata_id.as_str())
    }
}

/// `Links` block of a ComputerSystem
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct SystemLinks {
    #[serde(default)]
    pub managed_by: Vec<ODataId>,
}

/// `Boot` block of a ComputerSystem, also used as the PATCH body
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Boot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_source_override_target: Option<BootSourceOverrideTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_source_override_enabled: Option<BootSourceOverrideEnabled>,
    #[serde(
        rename = "BootSourceOverrideTarget@Redfish.AllowableValues",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub allowable_targets: Vec<BootSourceOverrideTarget>,
}

/// PATCH body for `Systems/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SystemBootPatch {
    pub boot: Boot,
}

impl SystemBootPatch {
    pub fn new(target: BootSourceOverrideTarget, enabled: BootSourceOverrideEnabled) -> Self {
        Self {
            boot: Boot {
                boot_source_override_target: Some(target),
                boot_source_override_enabled: Some(enabled),
                allowable_targets: Vec::new(),
            },
        }
    }
}

/// VirtualMedia resource (one slot on a manager)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VirtualMedia {
    #[serde(rename = "@odata.id", default)]
    pub odata_id: String,
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_types: Vec<MediaType>,
    #[serde(default)]
    pub inserted: Option<bool>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub write_protected: Option<bool>,
}

impl VirtualMedia {
    /// Whether the BMC reports an image mounted in this slot
    pub fn is_inserted(&self) -> bool {
        self.inserted.unwrap_or(false)
    }

    /// First optical (CD/DVD) media type this slot supports
    pub fn optical_media_type(&self) -> Option<MediaType> {
        self.media_types.iter().copied().find(MediaType::is_optical)
    }
}

/// Request body for the `VirtualMedia.InsertMedia` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InsertMediaRequest {
    pub image: String,
    pub inserted: bool,
    pub write_protected: bool,
}

impl InsertMediaRequest {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            inserted: true,
            write_protected: true,
        }
    }
}

/// Request body for the `ComputerSystem.Reset` action
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ResetRequest {
    pub reset_type: ResetType,
}

/// Virtual media types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MediaType {
    #[serde(rename = "CD")]
    Cd,
    #[serde(rename = "DVD")]
    Dvd,
    Floppy,
    #[serde(rename = "USBStick")]
    UsbStick,
    #[serde(other)]
    Other,
}

impl MediaType {
    /// CD and DVD are the optical (installer image) class
    pub fn is_optical(&self) -> bool {
        matches!(self, MediaType::Cd | MediaType::Dvd)
    }

    /// Boot override target that boots from a slot of this media type
    pub fn boot_target(self) -> Option<BootSourceOverrideTarget> {
        match self {
            MediaType::Cd | MediaType::Dvd => Some(BootSourceOverrideTarget::Cd),
            MediaType::UsbStick => Some(BootSourceOverrideTarget::Usb),
            MediaType::Floppy => Some(BootSourceOverrideTarget::Floppy),
            MediaType::Other => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Cd => "CD",
            MediaType::Dvd => "DVD",
            MediaType::Floppy => "Floppy",
            MediaType::UsbStick => "USBStick",
            MediaType::Other => "Other",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boot source override targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BootSourceOverrideTarget {
    None,
    Pxe,
    Floppy,
    Cd,
    Usb,
    Hdd,
    BiosSetup,
    Utilities,
    Diags,
    UefiShell,
    UefiTarget,
    #[serde(rename = "SDCard")]
    SdCard,
    UefiHttp,
    RemoteDrive,
    UefiBootNext,
    Recovery,
    #[serde(other)]
    Other,
}

impl BootSourceOverrideTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            BootSourceOverrideTarget::None => "None",
            BootSourceOverrideTarget::Pxe => "Pxe",
            BootSourceOverrideTarget::Floppy => "Floppy",
            BootSourceOverrideTarget::Cd => "Cd",
            BootSourceOverrideTarget::Usb => "Usb",
            BootSourceOverrideTarget::Hdd => "Hdd",
            BootSourceOverrideTarget::BiosSetup => "BiosSetup",
            BootSourceOverrideTarget::Utilities => "Utilities",
            BootSourceOverrideTarget::Diags => "Diags",
            BootSourceOverrideTarget::UefiShell => "UefiShell",
            BootSourceOverrideTarget::UefiTarget => "UefiTarget",
            BootSourceOverrideTarget::SdCard => "SDCard",
            BootSourceOverrideTarget::UefiHttp => "UefiHttp",
            BootSourceOverrideTarget::RemoteDrive => "RemoteDrive",
            BootSourceOverrideTarget::UefiBootNext => "UefiBootNext",
            BootSourceOverrideTarget::Recovery => "Recovery",
            BootSourceOverrideTarget::Other => "Other",
        }
    }
}

impl fmt::Display for BootSourceOverrideTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a boot source override stays in effect
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BootSourceOverrideEnabled {
    Disabled,
    Once,
    Continuous,
}

/// ComputerSystem power states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
    Paused,
    #[serde(other)]
    Unknown,
}

/// `ComputerSystem.Reset` reset types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    GracefulRestart,
    ForceRestart,
    Nmi,
    ForceOn,
    PushPowerButton,
    PowerCycle,
}

impl ResetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetType::On => "On",
            ResetType::ForceOff => "ForceOff",
            ResetType::GracefulShutdown => "GracefulShutdown",
            ResetType::GracefulRestart => "GracefulRestart",
            ResetType::ForceRestart => "ForceRestart",
            ResetType::Nmi => "Nmi",
            ResetType::ForceOn => "ForceOn",
            ResetType::PushPowerButton => "PushPowerButton",
            ResetType::PowerCycle => "PowerCycle",
        }
    }
}

impl fmt::Display for ResetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
