use crate::lxd::{LxdDevices, LxdProfileName};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use std::collections::BTreeMap;

/// Profile as returned by `GET /1.0/profiles/<name>`.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LxdProfile {
    pub name: LxdProfileName,

    #[serde(default)]
    pub description: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub config: BTreeMap<String, String>,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub devices: LxdDevices,

    // LXD returns `null` for profiles nobody refers to
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub used_by: Vec<String>,
}

impl LxdProfile {
    /// Returns the updatable part of this profile.
    pub fn to_put(&self) -> LxdProfilePut {
        LxdProfilePut {
            description: self.description.clone(),
            config: self.config.clone(),
            devices: self.devices.clone(),
        }
    }

    pub fn is_used(&self) -> bool {
        !self.used_by.is_empty()
    }
}

/// Body of `PUT /1.0/profiles/<name>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LxdProfilePut {
    pub description: String,
    pub config: BTreeMap<String, String>,
    pub devices: LxdDevices,
}

/// Body of `POST /1.0/profiles`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LxdProfilesPost {
    pub name: LxdProfileName,

    #[serde(flatten)]
    pub profile: LxdProfilePut,
}
