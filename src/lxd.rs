mod clients;
mod error;
mod models;

pub use self::{clients::*, error::*, models::*};

/// Narrow view of the LXD REST API: profiles and projects, addressed by remote
/// and project.
pub trait LxdClient {
    /// Returns given profile together with its current etag.
    ///
    /// # Errors
    ///
    /// - Fails with [`LxdError::NoSuchProfile`] when the profile doesn't exist.
    fn profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfileName,
    ) -> LxdResult<(LxdProfile, LxdEtag)>;

    /// Lists names of all the profiles within given project.
    fn profile_names(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<Vec<LxdProfileName>>;

    /// # Errors
    ///
    /// - Fails with [`LxdError::ProfileAlreadyExists`] when there's already a
    ///   profile with that name in given project.
    fn create_profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfilesPost,
    ) -> LxdResult<()>;

    /// Replaces given profile's description, config and devices.
    ///
    /// # Errors
    ///
    /// - Fails with [`LxdError::EtagMismatch`] when the profile has changed
    ///   since `etag` was obtained.
    ///
    /// Clients that can't pass the etag to LXD itself (e.g.
    /// [`LxdProcessClient`]) compare it on a separate read right before the
    /// write, so a change landing between both requests goes undetected.
    fn update_profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfileName,
        body: &LxdProfilePut,
        etag: &LxdEtag,
    ) -> LxdResult<()>;

    fn delete_profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfileName,
    ) -> LxdResult<()>;

    fn project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<(LxdProject, LxdEtag)>;

    fn create_project(&mut self, remote: &LxdRemoteName, project: &LxdProjectsPost)
        -> LxdResult<()>;

    /// Replaces given project's description and config.
    ///
    /// # Errors
    ///
    /// - Fails with [`LxdError::EtagMismatch`] when the project has changed
    ///   since `etag` was obtained; the same non-atomicity caveat as for
    ///   [`Self::update_profile()`] applies.
    fn update_project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        body: &LxdProjectPut,
        etag: &LxdEtag,
    ) -> LxdResult<()>;

    fn delete_project(&mut self, remote: &LxdRemoteName, project: &LxdProjectName)
        -> LxdResult<()>;
}

impl dyn LxdClient + '_ {
    /// Binds this client to given remote and project, so that profile
    /// operations don't have to repeat the namespace.
    pub fn use_project<'a>(
        &'a mut self,
        remote: &'a LxdRemoteName,
        project: &'a LxdProjectName,
    ) -> LxdProjectScope<'a> {
        LxdProjectScope {
            lxd: self,
            remote,
            project,
        }
    }
}

pub struct LxdProjectScope<'a> {
    lxd: &'a mut dyn LxdClient,
    remote: &'a LxdRemoteName,
    project: &'a LxdProjectName,
}

impl LxdProjectScope<'_> {
    pub fn project(&self) -> &LxdProjectName {
        self.project
    }

    pub fn profile(&mut self, profile: &LxdProfileName) -> LxdResult<(LxdProfile, LxdEtag)> {
        self.lxd.profile(self.remote, self.project, profile)
    }

    pub fn profile_names(&mut self) -> LxdResult<Vec<LxdProfileName>> {
        self.lxd.profile_names(self.remote, self.project)
    }

    pub fn has_profile(&mut self, profile: &LxdProfileName) -> LxdResult<bool> {
        Ok(self.profile_names()?.iter().any(|name| name == profile))
    }

    pub fn create_profile(&mut self, profile: &LxdProfilesPost) -> LxdResult<()> {
        self.lxd.create_profile(self.remote, self.project, profile)
    }

    pub fn update_profile(
        &mut self,
        profile: &LxdProfileName,
        body: &LxdProfilePut,
        etag: &LxdEtag,
    ) -> LxdResult<()> {
        self.lxd
            .update_profile(self.remote, self.project, profile, body, etag)
    }

    pub fn delete_profile(&mut self, profile: &LxdProfileName) -> LxdResult<()> {
        self.lxd.delete_profile(self.remote, self.project, profile)
    }
}
