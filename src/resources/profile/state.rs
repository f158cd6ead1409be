use crate::prelude::*;
use crate::resources::serde::config_map;
use itertools::Itertools;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declared (and, after each read, actual) state of an `lxd_profile`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileState {
    pub name: LxdProfileName,

    #[serde(default)]
    pub description: String,

    #[serde(default, deserialize_with = "config_map")]
    pub config: BTreeMap<String, String>,

    #[serde(default, rename = "device", deserialize_with = "device_set")]
    pub devices: BTreeSet<ProfileDevice>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<LxdRemoteName>,

    #[serde(default)]
    pub project: LxdProjectName,
}

impl ProfileState {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: LxdProfileName::new(name),
            description: Default::default(),
            config: Default::default(),
            devices: Default::default(),
            remote: None,
            project: Default::default(),
        }
    }

    /// Returns the remote this profile is declared on, if any; an empty name
    /// means the default remote.
    pub fn remote(&self) -> Option<&LxdRemoteName> {
        self.remote.as_ref().filter(|remote| !remote.as_str().is_empty())
    }

    pub fn project(&self) -> LxdProjectName {
        self.project.clone().or_default()
    }

    /// Checks what can't be expressed through the types alone: device names
    /// are unique and no device declares `type` among its properties.
    pub fn validate(&self) -> Result<()> {
        validate_devices(&self.devices)
    }

    pub fn to_put(&self) -> LxdProfilePut {
        LxdProfilePut {
            description: self.description.clone(),
            config: self.config.clone(),
            devices: ProfileDevice::to_lxd_all(&self.devices),
        }
    }

    /// Replaces description, config and devices with what the remote says,
    /// leaving the identifying fields (name, remote, project) as they are.
    pub fn sync_with(&mut self, profile: &LxdProfile) -> Result<()> {
        self.description = profile.description.clone();
        self.config = profile.config.clone();
        self.devices = ProfileDevice::from_lxd_all(&profile.devices)?;

        Ok(())
    }
}

/// A single device, as declared inside the `device` block.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileDevice {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: LxdDeviceType,

    pub properties: BTreeMap<String, String>,
}

impl ProfileDevice {
    /// Key LXD reserves inside a device's flat map for the device type.
    pub const RESERVED_PROPERTY: &'static str = "type";

    pub fn from_lxd(name: &str, device: &LxdDevice) -> Result<Self> {
        let kind = device
            .kind
            .parse::<LxdDeviceType>()
            .with_context(|| format!("Couldn't read device `{}`", name))?;

        Ok(Self {
            name: name.into(),
            kind,
            properties: device.properties.clone(),
        })
    }

    pub fn from_lxd_all(devices: &LxdDevices) -> Result<BTreeSet<Self>> {
        devices
            .iter()
            .map(|(name, device)| Self::from_lxd(name, device))
            .collect()
    }

    /// Converts this device into LXD's representation; a `type` property is
    /// never copied over, so it can't shadow the device's actual type.
    pub fn to_lxd(&self) -> LxdDevice {
        LxdDevice {
            kind: self.kind.as_str().into(),
            properties: self
                .properties
                .iter()
                .filter(|(key, _)| key.as_str() != Self::RESERVED_PROPERTY)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        }
    }

    /// Converts declared devices into LXD's representation; devices without
    /// a name are skipped, since LXD can't store them.
    pub fn to_lxd_all<'a>(devices: impl IntoIterator<Item = &'a Self>) -> LxdDevices {
        devices
            .into_iter()
            .filter(|device| !device.name.is_empty())
            .map(|device| (device.name.clone(), device.to_lxd()))
            .collect()
    }
}

fn validate_devices(devices: &BTreeSet<ProfileDevice>) -> Result<()> {
    for device in devices {
        if device.properties.contains_key(ProfileDevice::RESERVED_PROPERTY) {
            bail!(
                "Device `{}` must not declare `{}` among its properties",
                device.name,
                ProfileDevice::RESERVED_PROPERTY
            );
        }
    }

    if let Some(name) = devices.iter().map(|device| &device.name).duplicates().next() {
        bail!("Device `{}` is declared more than once", name);
    }

    Ok(())
}

fn device_set<'de, D>(d: D) -> Result<BTreeSet<ProfileDevice>, D::Error>
where
    D: Deserializer<'de>,
{
    let devices = BTreeSet::<ProfileDevice>::deserialize(d)?;

    validate_devices(&devices).map_err(|err| D::Error::custom(format!("{:#}", err)))?;

    Ok(devices)
}
