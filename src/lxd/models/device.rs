use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A device as LXD keeps it: on the wire it's a single flat map, in which
/// `type` is the only reserved key and everything else is a property.
///
/// A `name` key is a regular property (e.g. the interface name of a NIC); the
/// device's own name is the key under which it's stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct LxdDevice {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

pub type LxdDevices = BTreeMap<String, LxdDevice>;
