use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Device types LXD accepts inside profiles.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LxdDeviceType {
    None,
    Disk,
    Nic,
    UnixChar,
    UnixBlock,
    UnixHotplug,
    Usb,
    Gpu,
    Infiniband,
    Proxy,
    Tpm,
    Pci,
}

impl LxdDeviceType {
    pub const ALL: [Self; 12] = [
        Self::None,
        Self::Disk,
        Self::Nic,
        Self::UnixChar,
        Self::UnixBlock,
        Self::UnixHotplug,
        Self::Usb,
        Self::Gpu,
        Self::Infiniband,
        Self::Proxy,
        Self::Tpm,
        Self::Pci,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Disk => "disk",
            Self::Nic => "nic",
            Self::UnixChar => "unix-char",
            Self::UnixBlock => "unix-block",
            Self::UnixHotplug => "unix-hotplug",
            Self::Usb => "usb",
            Self::Gpu => "gpu",
            Self::Infiniband => "infiniband",
            Self::Proxy => "proxy",
            Self::Tpm => "tpm",
            Self::Pci => "pci",
        }
    }
}

impl FromStr for LxdDeviceType {
    type Err = UnknownDeviceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownDeviceType(s.into()))
    }
}

impl fmt::Display for LxdDeviceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown device type: `{0}`")]
pub struct UnknownDeviceType(pub String);
