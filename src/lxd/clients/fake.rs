use crate::lxd::*;
use anyhow::anyhow;
use itertools::Itertools;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// An in-memory LXD, keeping profiles and projects of any number of remotes.
///
/// The `default` project exists implicitly on every remote; all the other
/// projects have to be created (or added) before profiles can be put inside
/// them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LxdFakeClient {
    profiles: BTreeMap<LxdProfileId, Revision<LxdProfile>>,
    projects: BTreeMap<LxdProjectId, Revision<LxdProject>>,

    errors: HashSet<LxdFakeError<'static>>,

    profile_races: HashSet<LxdProfileId>,
    project_races: HashSet<LxdProjectId>,
}

impl LxdFakeClient {
    pub fn add_profile(&mut self, profile: LxdFakeProfile<'_>) {
        let LxdFakeProfile {
            remote,
            project,
            name,
            description,
            config,
            devices,
            used_by,
        } = profile;

        let id = LxdProfileId::new(
            &LxdRemoteName::new(remote),
            &LxdProjectName::new(project),
            &LxdProfileName::new(name),
        );

        let profile = LxdProfile {
            name: LxdProfileName::new(name),
            description: description.into(),
            config: config
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            devices,
            used_by: used_by.iter().map(|user| user.to_string()).collect(),
        };

        self.profiles.insert(id, Revision::new(profile));
    }

    pub fn add_project(&mut self, remote: &str, name: &str) {
        let remote = LxdRemoteName::new(remote);
        let name = LxdProjectName::new(name);

        self.projects.insert(
            LxdProjectId::new(&remote, &name),
            Revision::new(LxdProject {
                name,
                description: Default::default(),
                config: Default::default(),
                used_by: Default::default(),
            }),
        );
    }

    pub fn inject_error(&mut self, error: LxdFakeError<'static>) {
        self.errors.insert(error);
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Makes every subsequent fetch of given profile be followed by someone
    /// else modifying it, so that the etag handed out is already stale.
    pub fn race_on_profile(&mut self, remote: &str, project: &str, profile: &str) {
        self.profile_races.insert(LxdProfileId::new(
            &LxdRemoteName::new(remote),
            &LxdProjectName::new(project),
            &LxdProfileName::new(profile),
        ));
    }

    /// Same as [`Self::race_on_profile()`], but for projects.
    pub fn race_on_project(&mut self, remote: &str, project: &str) {
        self.project_races.insert(LxdProjectId::new(
            &LxdRemoteName::new(remote),
            &LxdProjectName::new(project),
        ));
    }

    fn check_error(&self, error: LxdFakeError<'_>) -> LxdResult<()> {
        let errors: &HashSet<LxdFakeError<'_>> = &self.errors;

        if errors.contains(&error) {
            Err(LxdError::InjectedError)
        } else {
            Ok(())
        }
    }

    fn ensure_project_exists(
        &self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<()> {
        if project.is_default() || self.projects.contains_key(&LxdProjectId::new(remote, project))
        {
            Ok(())
        } else {
            Err(LxdError::NoSuchProject {
                remote: remote.to_owned(),
                project: project.to_owned(),
            })
        }
    }

    fn profile_mut(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfileName,
    ) -> LxdResult<&mut Revision<LxdProfile>> {
        self.profiles
            .get_mut(&LxdProfileId::new(remote, project, profile))
            .ok_or_else(|| LxdError::NoSuchProfile {
                remote: remote.to_owned(),
                project: project.to_owned(),
                profile: profile.to_owned(),
            })
    }

    fn project_mut(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<&mut Revision<LxdProject>> {
        self.projects
            .get_mut(&LxdProjectId::new(remote, project))
            .ok_or_else(|| LxdError::NoSuchProject {
                remote: remote.to_owned(),
                project: project.to_owned(),
            })
    }
}

impl LxdClient for LxdFakeClient {
    fn profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfileName,
    ) -> LxdResult<(LxdProfile, LxdEtag)> {
        self.check_error(LxdFakeError::OnGetProfile {
            remote: remote.as_str(),
            project: project.as_str(),
            profile: profile.as_str(),
        })?;

        self.ensure_project_exists(remote, project)?;

        let found = self.profile_mut(remote, project, profile)?;
        let result = (found.value.clone(), found.etag());

        if self
            .profile_races
            .contains(&LxdProfileId::new(remote, project, profile))
        {
            let found = self.profile_mut(remote, project, profile)?;

            found.value.description = "(modified concurrently)".into();
            found.revision += 1;
        }

        Ok(result)
    }

    fn profile_names(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<Vec<LxdProfileName>> {
        self.check_error(LxdFakeError::OnProfileNames {
            remote: remote.as_str(),
            project: project.as_str(),
        })?;

        self.ensure_project_exists(remote, project)?;

        let names = self
            .profiles
            .keys()
            .filter(|id| &id.remote == remote && &id.project == project)
            .map(|id| id.profile.clone())
            .sorted()
            .collect();

        Ok(names)
    }

    fn create_profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfilesPost,
    ) -> LxdResult<()> {
        self.check_error(LxdFakeError::OnCreateProfile {
            remote: remote.as_str(),
            project: project.as_str(),
            profile: profile.name.as_str(),
        })?;

        self.ensure_project_exists(remote, project)?;

        let id = LxdProfileId::new(remote, project, &profile.name);

        if self.profiles.contains_key(&id) {
            return Err(LxdError::ProfileAlreadyExists {
                remote: remote.to_owned(),
                project: project.to_owned(),
                profile: profile.name.to_owned(),
            });
        }

        self.profiles.insert(
            id,
            Revision::new(LxdProfile {
                name: profile.name.clone(),
                description: profile.profile.description.clone(),
                config: profile.profile.config.clone(),
                devices: profile.profile.devices.clone(),
                used_by: Default::default(),
            }),
        );

        Ok(())
    }

    fn update_profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfileName,
        body: &LxdProfilePut,
        etag: &LxdEtag,
    ) -> LxdResult<()> {
        self.check_error(LxdFakeError::OnUpdateProfile {
            remote: remote.as_str(),
            project: project.as_str(),
            profile: profile.as_str(),
        })?;

        self.ensure_project_exists(remote, project)?;

        let found = self.profile_mut(remote, project, profile)?;

        if &found.etag() != etag {
            return Err(LxdError::EtagMismatch {
                remote: remote.to_owned(),
                object: format!("profiles/{}?project={}", profile, project),
            });
        }

        found.value.description = body.description.clone();
        found.value.config = body.config.clone();
        found.value.devices = body.devices.clone();
        found.revision += 1;

        Ok(())
    }

    fn delete_profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfileName,
    ) -> LxdResult<()> {
        self.check_error(LxdFakeError::OnDeleteProfile {
            remote: remote.as_str(),
            project: project.as_str(),
            profile: profile.as_str(),
        })?;

        self.ensure_project_exists(remote, project)?;

        let id = LxdProfileId::new(remote, project, profile);

        let found = self
            .profiles
            .get(&id)
            .ok_or_else(|| LxdError::NoSuchProfile {
                remote: remote.to_owned(),
                project: project.to_owned(),
                profile: profile.to_owned(),
            })?;

        if found.value.is_used() {
            return Err(LxdError::Other(anyhow!(
                "Profile `{}` is currently in use",
                profile
            )));
        }

        self.profiles.remove(&id);

        Ok(())
    }

    fn project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<(LxdProject, LxdEtag)> {
        self.check_error(LxdFakeError::OnGetProject {
            remote: remote.as_str(),
            project: project.as_str(),
        })?;

        let found = self.project_mut(remote, project)?;
        let result = (found.value.clone(), found.etag());

        if self
            .project_races
            .contains(&LxdProjectId::new(remote, project))
        {
            let found = self.project_mut(remote, project)?;

            found.value.description = "(modified concurrently)".into();
            found.revision += 1;
        }

        Ok(result)
    }

    fn create_project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectsPost,
    ) -> LxdResult<()> {
        let id = LxdProjectId::new(remote, &project.name);

        if project.name.is_default() || self.projects.contains_key(&id) {
            return Err(LxdError::ProjectAlreadyExists {
                remote: remote.to_owned(),
                project: project.name.to_owned(),
            });
        }

        self.projects.insert(
            id,
            Revision::new(LxdProject {
                name: project.name.clone(),
                description: project.project.description.clone(),
                config: project.project.config.clone(),
                used_by: Default::default(),
            }),
        );

        Ok(())
    }

    fn update_project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        body: &LxdProjectPut,
        etag: &LxdEtag,
    ) -> LxdResult<()> {
        self.check_error(LxdFakeError::OnUpdateProject {
            remote: remote.as_str(),
            project: project.as_str(),
        })?;

        let found = self.project_mut(remote, project)?;

        if &found.etag() != etag {
            return Err(LxdError::EtagMismatch {
                remote: remote.to_owned(),
                object: format!("projects/{}", project),
            });
        }

        found.value.description = body.description.clone();
        found.value.config = body.config.clone();
        found.revision += 1;

        Ok(())
    }

    fn delete_project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<()> {
        self.project_mut(remote, project)?;

        let has_profiles = self
            .profiles
            .keys()
            .any(|id| &id.remote == remote && &id.project == project);

        if has_profiles {
            return Err(LxdError::Other(anyhow!(
                "Only empty projects can be removed (`{}` still has profiles)",
                project
            )));
        }

        self.projects.remove(&LxdProjectId::new(remote, project));

        Ok(())
    }
}

impl fmt::Display for LxdFakeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let projects = self.projects.iter().map(|(id, project)| {
            let header = format!("project {}:{}", id.remote, id.project);
            (
                header,
                &project.value.description,
                &project.value.config,
                None,
                &project.value.used_by,
            )
        });

        let profiles = self.profiles.iter().map(|(id, profile)| {
            let header = format!("profile {}:{}/{}", id.remote, id.project, id.profile);
            (
                header,
                &profile.value.description,
                &profile.value.config,
                Some(&profile.value.devices),
                &profile.value.used_by,
            )
        });

        for (idx, (header, description, config, devices, used_by)) in
            projects.chain(profiles).enumerate()
        {
            if idx > 0 {
                writeln!(f)?;
            }

            writeln!(f, "{}", header)?;

            if !description.is_empty() {
                writeln!(f, "-> description: {}", description)?;
            }

            for (key, value) in config {
                writeln!(f, "-> config: {}={}", key, value)?;
            }

            for (name, device) in devices.into_iter().flatten() {
                let properties = device
                    .properties
                    .iter()
                    .map(|(key, value)| format!(", {}={}", key, value))
                    .join("");

                writeln!(f, "-> device {}: type={}{}", name, device.kind, properties)?;
            }

            for user in used_by {
                writeln!(f, "-> used by: {}", user)?;
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Revision<T> {
    value: T,
    revision: u64,
}

impl<T> Revision<T> {
    fn new(value: T) -> Self {
        Self { value, revision: 1 }
    }

    fn etag(&self) -> LxdEtag {
        LxdEtag::new(self.revision.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct LxdProfileId {
    remote: LxdRemoteName,
    project: LxdProjectName,
    profile: LxdProfileName,
}

impl LxdProfileId {
    fn new(remote: &LxdRemoteName, project: &LxdProjectName, profile: &LxdProfileName) -> Self {
        Self {
            remote: remote.to_owned(),
            project: project.to_owned(),
            profile: profile.to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct LxdProjectId {
    remote: LxdRemoteName,
    project: LxdProjectName,
}

impl LxdProjectId {
    fn new(remote: &LxdRemoteName, project: &LxdProjectName) -> Self {
        Self {
            remote: remote.to_owned(),
            project: project.to_owned(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LxdFakeProfile<'a> {
    pub remote: &'a str,
    pub project: &'a str,
    pub name: &'a str,
    pub description: &'a str,
    pub config: Vec<(&'a str, &'a str)>,
    pub devices: LxdDevices,
    pub used_by: Vec<&'a str>,
}

impl Default for LxdFakeProfile<'static> {
    fn default() -> Self {
        Self {
            remote: "local",
            project: "default",
            name: "",
            description: "",
            config: Default::default(),
            devices: Default::default(),
            used_by: Default::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LxdFakeError<'a> {
    OnGetProfile {
        remote: &'a str,
        project: &'a str,
        profile: &'a str,
    },

    OnProfileNames {
        remote: &'a str,
        project: &'a str,
    },

    OnCreateProfile {
        remote: &'a str,
        project: &'a str,
        profile: &'a str,
    },

    OnUpdateProfile {
        remote: &'a str,
        project: &'a str,
        profile: &'a str,
    },

    OnDeleteProfile {
        remote: &'a str,
        project: &'a str,
        profile: &'a str,
    },

    OnGetProject {
        remote: &'a str,
        project: &'a str,
    },

    OnUpdateProject {
        remote: &'a str,
        project: &'a str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use pretty_assertions as pa;

    fn client() -> LxdFakeClient {
        let mut client = LxdFakeClient::default();

        client.add_project("local", "app");

        client.add_profile(LxdFakeProfile {
            name: "web",
            description: "Web servers",
            config: vec![("limits.cpu", "2")],
            devices: devices(&[("root", "disk", &[("path", "/"), ("pool", "default")])]),
            ..Default::default()
        });

        client.add_profile(LxdFakeProfile {
            project: "app",
            name: "db",
            used_by: vec!["/1.0/instances/mysql?project=app"],
            ..Default::default()
        });

        client.add_profile(LxdFakeProfile {
            remote: "remote-a",
            name: "web",
            ..Default::default()
        });

        client
    }

    #[test]
    fn display() {
        crate::assert_lxd!(
            r#"
            project local:app

            profile local:app/db
            -> used by: /1.0/instances/mysql?project=app

            profile local:default/web
            -> description: Web servers
            -> config: limits.cpu=2
            -> device root: type=disk, path=/, pool=default

            profile remote-a:default/web
            "#,
            client()
        );
    }

    mod profile {
        use super::*;

        #[test]
        fn ok() {
            let (profile, etag) = client()
                .profile(&remote_name("local"), &project_name("default"), &profile_name("web"))
                .unwrap();

            assert_eq!("Web servers", profile.description);
            assert_eq!("1", etag.as_str());
        }

        #[test]
        fn given_unknown_profile() {
            let actual = client()
                .profile(&remote_name("local"), &project_name("app"), &profile_name("web"))
                .unwrap_err();

            let expected = LxdError::NoSuchProfile {
                remote: remote_name("local"),
                project: project_name("app"),
                profile: profile_name("web"),
            };

            pa::assert_eq!(expected, actual);
        }

        #[test]
        fn given_unknown_project() {
            let actual = client()
                .profile(&remote_name("local"), &project_name("unknown"), &profile_name("web"))
                .unwrap_err();

            let expected = LxdError::NoSuchProject {
                remote: remote_name("local"),
                project: project_name("unknown"),
            };

            pa::assert_eq!(expected, actual);
        }
    }

    mod profile_names {
        use super::*;

        #[test]
        fn ok() {
            let mut client = client();

            pa::assert_eq!(
                vec![profile_name("web")],
                client
                    .profile_names(&remote_name("local"), &project_name("default"))
                    .unwrap()
            );

            pa::assert_eq!(
                vec![profile_name("db")],
                client
                    .profile_names(&remote_name("local"), &project_name("app"))
                    .unwrap()
            );

            pa::assert_eq!(
                Vec::<LxdProfileName>::new(),
                client
                    .profile_names(&remote_name("unknown"), &project_name("default"))
                    .unwrap()
            );
        }
    }

    mod create_profile {
        use super::*;

        #[test]
        fn given_existing_profile() {
            let actual = client()
                .create_profile(
                    &remote_name("local"),
                    &project_name("default"),
                    &LxdProfilesPost {
                        name: profile_name("web"),
                        profile: Default::default(),
                    },
                )
                .unwrap_err();

            let expected = LxdError::ProfileAlreadyExists {
                remote: remote_name("local"),
                project: project_name("default"),
                profile: profile_name("web"),
            };

            pa::assert_eq!(expected, actual);
        }
    }

    mod update_profile {
        use super::*;

        #[test]
        fn ok() {
            let mut client = client();
            let remote = remote_name("local");
            let project = project_name("default");
            let name = profile_name("web");

            let (profile, etag) = client.profile(&remote, &project, &name).unwrap();

            let body = LxdProfilePut {
                description: "Changed".into(),
                ..profile.to_put()
            };

            client
                .update_profile(&remote, &project, &name, &body, &etag)
                .unwrap();

            let (profile, new_etag) = client.profile(&remote, &project, &name).unwrap();

            assert_eq!("Changed", profile.description);
            assert_ne!(etag, new_etag);
        }

        #[test]
        fn given_stale_etag() {
            let mut client = client();
            let remote = remote_name("local");
            let project = project_name("default");
            let name = profile_name("web");

            let (profile, etag) = client.profile(&remote, &project, &name).unwrap();

            client
                .update_profile(&remote, &project, &name, &profile.to_put(), &etag)
                .unwrap();

            let body = LxdProfilePut {
                description: "Changed".into(),
                ..profile.to_put()
            };

            let actual = client
                .update_profile(&remote, &project, &name, &body, &etag)
                .unwrap_err();

            assert!(actual.is_conflict());

            let (profile, _) = client.profile(&remote, &project, &name).unwrap();

            assert_eq!("Web servers", profile.description);
        }
    }

    mod delete_profile {
        use super::*;

        #[test]
        fn ok() {
            let mut client = client();

            client
                .delete_profile(
                    &remote_name("local"),
                    &project_name("default"),
                    &profile_name("web"),
                )
                .unwrap();

            crate::assert_lxd!(
                r#"
                project local:app

                profile local:app/db
                -> used by: /1.0/instances/mysql?project=app

                profile remote-a:default/web
                "#,
                client
            );
        }

        #[test]
        fn given_used_profile() {
            let mut client = client();

            client
                .delete_profile(&remote_name("local"), &project_name("app"), &profile_name("db"))
                .unwrap_err();

            assert!(client
                .profile(&remote_name("local"), &project_name("app"), &profile_name("db"))
                .is_ok());
        }
    }

    mod update_project {
        use super::*;

        #[test]
        fn given_stale_etag() {
            let mut client = client();
            let remote = remote_name("local");
            let name = project_name("app");

            let (project, etag) = client.project(&remote, &name).unwrap();

            let body = LxdProjectPut {
                description: "First".into(),
                ..project.to_put()
            };

            client.update_project(&remote, &name, &body, &etag).unwrap();

            let body = LxdProjectPut {
                description: "Second".into(),
                ..project.to_put()
            };

            let actual = client
                .update_project(&remote, &name, &body, &etag)
                .unwrap_err();

            assert!(actual.is_conflict());

            let (project, _) = client.project(&remote, &name).unwrap();

            assert_eq!("First", project.description);
        }
    }

    mod delete_project {
        use super::*;

        #[test]
        fn given_project_with_profiles() {
            client()
                .delete_project(&remote_name("local"), &project_name("app"))
                .unwrap_err();
        }

        #[test]
        fn given_unknown_project() {
            let actual = client()
                .delete_project(&remote_name("local"), &project_name("unknown"))
                .unwrap_err();

            assert!(actual.is_not_found());
        }
    }
}
