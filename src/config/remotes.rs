use crate::prelude::*;
use itertools::Itertools;
use serde::Deserialize;

/// Remotes the provider is allowed to manage resources on; anything else is
/// rejected before LXD is even asked.
#[derive(Debug, Deserialize)]
#[serde(try_from = "Vec<LxdRemoteName>")]
pub struct Remotes(Vec<LxdRemoteName>);

impl Remotes {
    pub fn contains(&self, remote: &LxdRemoteName) -> bool {
        self.0.contains(remote)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LxdRemoteName> {
        self.0.iter()
    }
}

impl TryFrom<Vec<LxdRemoteName>> for Remotes {
    type Error = anyhow::Error;

    fn try_from(remotes: Vec<LxdRemoteName>) -> Result<Self> {
        if remotes.is_empty() {
            bail!("At least one remote has to be listed");
        }

        if remotes.iter().any(|remote| remote.as_str().is_empty()) {
            bail!("Remote names must not be empty");
        }

        if let Some(remote) = remotes.iter().duplicates().next() {
            bail!("Remote `{}` is listed more than once", remote);
        }

        Ok(Self(remotes))
    }
}

impl Default for Remotes {
    fn default() -> Self {
        Self(vec![LxdRemoteName::local()])
    }
}
