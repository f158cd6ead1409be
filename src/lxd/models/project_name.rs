use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of an LXD project, i.e. the namespace profiles live in.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LxdProjectName(String);

impl LxdProjectName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.as_str() == "default"
    }

    /// Treats an empty name as the default project, which is what LXD does
    /// when no `?project=` is given.
    pub fn or_default(self) -> Self {
        if self.0.is_empty() {
            Self::default()
        } else {
            self
        }
    }
}

impl Default for LxdProjectName {
    fn default() -> Self {
        Self::new("default")
    }
}

impl fmt::Display for LxdProjectName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
