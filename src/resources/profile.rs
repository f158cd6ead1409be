mod merge;
mod migrate;
mod state;

use crate::prelude::*;
use tracing::{debug, info};

pub use self::{merge::*, migrate::*, state::*};

/// Manages `lxd_profile` resources.
pub struct ProfileResource<'a> {
    config: &'a ProviderConfig,
    lxd: &'a mut dyn LxdClient,
}

impl<'a> ProfileResource<'a> {
    pub fn new(config: &'a ProviderConfig, lxd: &'a mut dyn LxdClient) -> Self {
        Self { config, lxd }
    }

    fn fetch(&mut self, state: &ProfileState) -> Result<(LxdProfile, LxdEtag)> {
        let config = self.config;
        let remote = config.select_remote(state.remote())?;
        let project = state.project();

        let (profile, etag) = self
            .lxd
            .use_project(remote, &project)
            .profile(&state.name)
            .with_context(|| {
                format!(
                    "Couldn't fetch profile {} (in project `{}`)",
                    state.name.on(remote),
                    project
                )
            })?;

        debug!("Retrieved profile {}: {:?}", state.name, profile);

        Ok((profile, etag))
    }
}

impl Resource for ProfileResource<'_> {
    type State = ProfileState;

    fn schema() -> Schema {
        let device = Schema::new()
            .with("name", Attribute::string().required())
            .with(
                "type",
                Attribute::string()
                    .required()
                    .one_of(LxdDeviceType::ALL.iter().map(LxdDeviceType::as_str)),
            )
            .with("properties", Attribute::map().required());

        Schema::new()
            .with("name", Attribute::string().required().immutable())
            .with("description", Attribute::string())
            .with("device", Attribute::set(device))
            .with("config", Attribute::map())
            .with("remote", Attribute::string().immutable().default(""))
            .with("project", Attribute::string().default(""))
    }

    fn create(&mut self, declared: &ProfileState) -> Result<ProfileState> {
        declared.validate()?;

        let config = self.config;
        let remote = config.select_remote(declared.remote())?;
        let project = declared.project();

        info!(
            "Creating profile {} (in project `{}`)",
            declared.name.on(remote),
            project
        );

        self.lxd
            .use_project(remote, &project)
            .create_profile(&LxdProfilesPost {
                name: declared.name.clone(),
                profile: declared.to_put(),
            })
            .with_context(|| format!("Couldn't create profile `{}`", declared.name))?;

        self.read(declared)
    }

    fn read(&mut self, state: &ProfileState) -> Result<ProfileState> {
        let (profile, _) = self.fetch(state)?;
        let mut state = state.clone();

        state.sync_with(&profile)?;

        Ok(state)
    }

    fn update(&mut self, prior: &ProfileState, declared: &ProfileState) -> Result<ProfileState> {
        declared.validate()?;

        let config = self.config;
        let remote = config.select_remote(declared.remote())?;
        let old_project = prior.project();
        let new_project = declared.project();

        if old_project != new_project {
            let migration =
                migrate_profile(self.lxd, remote, &prior.name, &old_project, &new_project)?;

            debug!("Migrated profile {}: {:?}", prior.name, migration);
        }

        let (profile, etag) = self.fetch(declared)?;

        if let Some(body) = merge_profile(profile.to_put(), prior, declared) {
            info!(
                "Updating profile {} (in project `{}`)",
                declared.name.on(remote),
                new_project
            );

            self.lxd
                .use_project(remote, &new_project)
                .update_profile(&declared.name, &body, &etag)
                .with_context(|| format!("Couldn't update profile `{}`", declared.name))?;
        }

        self.read(declared)
    }

    fn delete(&mut self, state: &ProfileState) -> Result<()> {
        let config = self.config;
        let remote = config.select_remote(state.remote())?;
        let project = state.project();

        info!(
            "Deleting profile {} (in project `{}`)",
            state.name.on(remote),
            project
        );

        self.lxd
            .use_project(remote, &project)
            .delete_profile(&state.name)
            .with_context(|| format!("Couldn't delete profile `{}`", state.name))
    }

    fn exists(&mut self, state: &ProfileState) -> Result<bool> {
        let config = self.config;
        let remote = config.select_remote(state.remote())?;
        let project = state.project();

        match self.lxd.use_project(remote, &project).profile(&state.name) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err).with_context(|| {
                format!("Couldn't check whether profile `{}` exists", state.name)
            }),
        }
    }

    fn import(&mut self, id: &str) -> Result<ProfileState> {
        let config = self.config;
        let (remote, name) = config.parse_remote(id)?;

        let state = ProfileState {
            remote: (remote != config.default_remote).then_some(remote),
            ..ProfileState::new(name)
        };

        self.read(&state)
            .with_context(|| format!("Couldn't import profile `{}`", id))
    }
}
