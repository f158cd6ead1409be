mod remotes;

use crate::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub use self::remotes::*;

/// Provider-wide configuration, handed to every resource controller when it's
/// constructed.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderConfig {
    #[serde(default)]
    pub default_remote: LxdRemoteName,
    #[serde(default)]
    pub remotes: Remotes,
    #[serde(default)]
    pub lxc_path: Option<PathBuf>,
}

impl ProviderConfig {
    #[cfg(test)]
    pub fn from_code(code: &str) -> Self {
        serde_yaml::from_str(code).unwrap()
    }

    pub fn load(file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref();

        let result: Result<Self> = (|| {
            let code = fs::read_to_string(file).context("Couldn't read file")?;
            let config: Self = serde_yaml::from_str(&code).context("Couldn't parse file")?;

            config.validate()?;

            Ok(config)
        })();

        result.with_context(|| format!("Couldn't load configuration from: {}", file.display()))
    }

    fn validate(&self) -> Result<()> {
        if !self.remotes.contains(&self.default_remote) {
            bail!(
                "Default remote `{}` is not listed among `remotes`",
                self.default_remote
            );
        }

        Ok(())
    }

    /// Returns the remote a resource should be managed on: either the one it
    /// declares, or the default one.
    pub fn select_remote<'a>(
        &'a self,
        remote: Option<&'a LxdRemoteName>,
    ) -> Result<&'a LxdRemoteName> {
        let remote = remote.unwrap_or(&self.default_remote);

        if !self.remotes.contains(remote) {
            bail!("The remote `{}` doesn't exist", remote);
        }

        Ok(remote)
    }

    /// Splits an identifier such as `remote:name` (or just `name`) into the
    /// remote and the name; bare names refer to the default remote.
    pub fn parse_remote<'a>(&self, id: &'a str) -> Result<(LxdRemoteName, &'a str)> {
        let (remote, name) = match id.split_once(':') {
            Some((remote, name)) => {
                if remote.is_empty() {
                    bail!("Invalid identifier `{}`: remote name is empty", id);
                }

                (LxdRemoteName::new(remote), name)
            }

            None => (self.default_remote.clone(), id),
        };

        if name.is_empty() {
            bail!("Invalid identifier `{}`: name is empty", id);
        }

        self.select_remote(Some(&remote))?;

        Ok((remote, name))
    }

    /// Returns the client to talk with LXD through.
    pub fn client(&self) -> Result<LxdProcessClient> {
        let lxd = if let Some(lxc_path) = &self.lxc_path {
            LxdProcessClient::new(lxc_path)
        } else {
            LxdProcessClient::find()
        };

        lxd.context("Couldn't initialize LXC client")
    }
}
