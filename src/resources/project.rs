use crate::prelude::*;
use crate::resources::serde::config_map;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Declared (and, after each read, actual) state of an `lxd_project`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectState {
    pub name: LxdProjectName,

    #[serde(default)]
    pub description: String,

    #[serde(default, deserialize_with = "config_map")]
    pub config: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<LxdRemoteName>,
}

impl ProjectState {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: LxdProjectName::new(name),
            description: Default::default(),
            config: Default::default(),
            remote: None,
        }
    }

    pub fn remote(&self) -> Option<&LxdRemoteName> {
        self.remote.as_ref().filter(|remote| !remote.as_str().is_empty())
    }

    pub fn to_put(&self) -> LxdProjectPut {
        LxdProjectPut {
            description: self.description.clone(),
            config: self.config.clone(),
        }
    }
}

/// Manages `lxd_project` resources.
pub struct ProjectResource<'a> {
    config: &'a ProviderConfig,
    lxd: &'a mut dyn LxdClient,
}

impl<'a> ProjectResource<'a> {
    pub fn new(config: &'a ProviderConfig, lxd: &'a mut dyn LxdClient) -> Self {
        Self { config, lxd }
    }

    fn fetch(&mut self, state: &ProjectState) -> Result<(LxdProject, LxdEtag)> {
        let config = self.config;
        let remote = config.select_remote(state.remote())?;

        let (project, etag) = self
            .lxd
            .project(remote, &state.name)
            .with_context(|| format!("Couldn't fetch project {}:{}", remote, state.name))?;

        debug!("Retrieved project {}: {:?}", state.name, project);

        Ok((project, etag))
    }
}

impl Resource for ProjectResource<'_> {
    type State = ProjectState;

    fn schema() -> Schema {
        Schema::new()
            .with("name", Attribute::string().required().immutable())
            .with("description", Attribute::string())
            .with("config", Attribute::map())
            .with("remote", Attribute::string().immutable().default(""))
    }

    fn create(&mut self, declared: &ProjectState) -> Result<ProjectState> {
        let config = self.config;
        let remote = config.select_remote(declared.remote())?;

        info!("Creating project {}:{}", remote, declared.name);

        self.lxd
            .create_project(
                remote,
                &LxdProjectsPost {
                    name: declared.name.clone(),
                    project: declared.to_put(),
                },
            )
            .with_context(|| format!("Couldn't create project `{}`", declared.name))?;

        self.read(declared)
    }

    fn read(&mut self, state: &ProjectState) -> Result<ProjectState> {
        let (project, _) = self.fetch(state)?;

        Ok(ProjectState {
            description: project.description,
            config: project.config,
            ..state.clone()
        })
    }

    fn update(&mut self, prior: &ProjectState, declared: &ProjectState) -> Result<ProjectState> {
        let config = self.config;
        let remote = config.select_remote(declared.remote())?;
        let (project, etag) = self.fetch(declared)?;

        let mut body = project.to_put();
        let mut changed = false;

        if prior.description != declared.description {
            changed = true;
            body.description = declared.description.clone();
        }

        if prior.config != declared.config {
            changed = true;
            body.config = declared.config.clone();
        }

        if changed {
            info!("Updating project {}:{}", remote, declared.name);

            self.lxd
                .update_project(remote, &declared.name, &body, &etag)
                .with_context(|| format!("Couldn't update project `{}`", declared.name))?;
        }

        self.read(declared)
    }

    fn delete(&mut self, state: &ProjectState) -> Result<()> {
        let config = self.config;
        let remote = config.select_remote(state.remote())?;

        info!("Deleting project {}:{}", remote, state.name);

        self.lxd
            .delete_project(remote, &state.name)
            .with_context(|| format!("Couldn't delete project `{}`", state.name))
    }

    fn exists(&mut self, state: &ProjectState) -> Result<bool> {
        let config = self.config;
        let remote = config.select_remote(state.remote())?;

        match self.lxd.project(remote, &state.name) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err).with_context(|| {
                format!("Couldn't check whether project `{}` exists", state.name)
            }),
        }
    }

    fn import(&mut self, id: &str) -> Result<ProjectState> {
        let config = self.config;
        let (remote, name) = config.parse_remote(id)?;

        let state = ProjectState {
            remote: (remote != config.default_remote).then_some(remote),
            ..ProjectState::new(name)
        };

        self.read(&state)
            .with_context(|| format!("Couldn't import project `{}`", id))
    }
}
