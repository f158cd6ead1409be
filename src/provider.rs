use crate::prelude::*;
use indexmap::IndexMap;
use tracing::debug;

/// Entry point for the host framework: owns the configuration and the LXD
/// client, and hands out controllers for each resource type.
pub struct Provider {
    config: ProviderConfig,
    lxd: Box<dyn LxdClient>,
}

impl Provider {
    pub fn new(config: ProviderConfig, lxd: Box<dyn LxdClient>) -> Self {
        Self { config, lxd }
    }

    /// Creates a provider talking to LXD through the `lxc` executable.
    pub fn from_config(config: ProviderConfig) -> Result<Self> {
        let lxd = config.client()?;

        debug!("Provider configured: {:?}", config);

        Ok(Self::new(config, Box::new(lxd)))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn profiles(&mut self) -> ProfileResource<'_> {
        ProfileResource::new(&self.config, &mut *self.lxd)
    }

    pub fn projects(&mut self) -> ProjectResource<'_> {
        ProjectResource::new(&self.config, &mut *self.lxd)
    }

    /// Returns schemas of all the resource types, keyed by the names the host
    /// framework knows them under.
    pub fn schemas() -> IndexMap<&'static str, Schema> {
        IndexMap::from([
            ("lxd_profile", ProfileResource::schema()),
            ("lxd_project", ProjectResource::schema()),
        ])
    }
}
