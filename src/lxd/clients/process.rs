use crate::lxd::*;
use anyhow::{anyhow, Context};
use pathsearch::find_executable_in_path;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::trace;

/// Talks to LXD through `lxc query`, which forwards raw REST requests to the
/// chosen remote and prints the response's metadata as JSON.
///
/// `lxc query` doesn't expose response headers, so the etag is computed here
/// from the record's contents and verified just before each update.
pub struct LxdProcessClient {
    lxc: PathBuf,
}

impl LxdProcessClient {
    pub fn new(lxc: impl AsRef<Path>) -> LxdResult<Self> {
        let lxc = lxc.as_ref();

        if !lxc.exists() {
            return Err(LxdError::Other(anyhow!(
                "Couldn't find the `lxc` executable: {}",
                lxc.display()
            )));
        }

        Ok(Self { lxc: lxc.into() })
    }

    pub fn find() -> LxdResult<Self> {
        let lxc = find_executable_in_path("lxc").ok_or_else(|| {
            anyhow!(
                "Couldn't find the `lxc` executable in your `PATH` - please try specifying \
                 exact location with `lxc-path`"
            )
        })?;

        Self::new(lxc)
    }

    fn query(
        &mut self,
        method: &str,
        remote: &LxdRemoteName,
        path: &str,
        body: Option<String>,
    ) -> Result<String, QueryError> {
        let mut command = Command::new(&self.lxc);

        command
            .arg("query")
            .arg("--request")
            .arg(method)
            .arg(format!("{}:{}", remote, path));

        if let Some(body) = body {
            command.arg("--data").arg(body);
        }

        trace!("Executing: lxc query --request {} {}:{}", method, remote, path);

        let output = command
            .output()
            .context("Couldn't launch the `lxc` executable")?;

        if output.status.success() {
            let stdout = String::from_utf8(output.stdout).context("Couldn't read lxc's stdout")?;

            Ok(stdout)
        } else {
            let stderr = String::from_utf8(output.stderr)
                .context("Couldn't read lxc's stderr")?
                .trim()
                .to_string();

            Err(QueryError::Rejected(stderr))
        }
    }

    fn parse<T>(out: String) -> LxdResult<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(&out)
            .context("Couldn't parse lxc's stdout")
            .map_err(LxdError::Other)
    }

    fn serialize(body: &impl Serialize) -> LxdResult<String> {
        serde_json::to_string(body)
            .context("Couldn't serialize request")
            .map_err(LxdError::Other)
    }

    fn etag(body: &impl Serialize) -> LxdResult<LxdEtag> {
        let mut hasher = DefaultHasher::new();

        Self::serialize(body)?.hash(&mut hasher);

        Ok(LxdEtag::new(format!("{:016x}", hasher.finish())))
    }

    fn profile_path(project: &LxdProjectName, profile: &LxdProfileName) -> String {
        format!("/1.0/profiles/{}?project={}", profile, project)
    }
}

impl LxdClient for LxdProcessClient {
    fn profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfileName,
    ) -> LxdResult<(LxdProfile, LxdEtag)> {
        let out = self
            .query("GET", remote, &Self::profile_path(project, profile), None)
            .map_err(|err| {
                err.into_lxd(|| LxdError::NoSuchProfile {
                    remote: remote.to_owned(),
                    project: project.to_owned(),
                    profile: profile.to_owned(),
                })
            })?;

        let profile: LxdProfile = Self::parse(out)?;
        let etag = Self::etag(&profile.to_put())?;

        Ok((profile, etag))
    }

    fn profile_names(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<Vec<LxdProfileName>> {
        let out = self
            .query(
                "GET",
                remote,
                &format!("/1.0/profiles?project={}", project),
                None,
            )
            .map_err(|err| {
                err.into_lxd(|| LxdError::NoSuchProject {
                    remote: remote.to_owned(),
                    project: project.to_owned(),
                })
            })?;

        let urls: Vec<String> = Self::parse(out)?;

        Ok(urls.iter().map(|url| profile_name_from_url(url)).collect())
    }

    fn create_profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfilesPost,
    ) -> LxdResult<()> {
        let body = Self::serialize(profile)?;

        self.query(
            "POST",
            remote,
            &format!("/1.0/profiles?project={}", project),
            Some(body),
        )
        .map_err(|err| {
            err.into_lxd_ex(
                || LxdError::NoSuchProject {
                    remote: remote.to_owned(),
                    project: project.to_owned(),
                },
                || LxdError::ProfileAlreadyExists {
                    remote: remote.to_owned(),
                    project: project.to_owned(),
                    profile: profile.name.to_owned(),
                },
            )
        })?;

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
        let (_, current_etag) = self.profile(remote, project, profile)?;

        if &current_etag != etag {
            return Err(LxdError::EtagMismatch {
                remote: remote.to_owned(),
                object: format!("profiles/{}?project={}", profile, project),
            });
        }

        let body = Self::serialize(body)?;

        self.query("PUT", remote, &Self::profile_path(project, profile), Some(body))
            .map_err(|err| {
                err.into_lxd(|| LxdError::NoSuchProfile {
                    remote: remote.to_owned(),
                    project: project.to_owned(),
                    profile: profile.to_owned(),
                })
            })?;

        Ok(())
    }

    fn delete_profile(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        profile: &LxdProfileName,
    ) -> LxdResult<()> {
        self.query("DELETE", remote, &Self::profile_path(project, profile), None)
            .map_err(|err| {
                err.into_lxd(|| LxdError::NoSuchProfile {
                    remote: remote.to_owned(),
                    project: project.to_owned(),
                    profile: profile.to_owned(),
                })
            })?;

        Ok(())
    }

    fn project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<(LxdProject, LxdEtag)> {
        let out = self
            .query("GET", remote, &format!("/1.0/projects/{}", project), None)
            .map_err(|err| {
                err.into_lxd(|| LxdError::NoSuchProject {
                    remote: remote.to_owned(),
                    project: project.to_owned(),
                })
            })?;

        let project: LxdProject = Self::parse(out)?;
        let etag = Self::etag(&project.to_put())?;

        Ok((project, etag))
    }

    fn create_project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectsPost,
    ) -> LxdResult<()> {
        let body = Self::serialize(project)?;

        self.query("POST", remote, "/1.0/projects", Some(body))
            .map_err(|err| {
                err.into_lxd_ex(
                    || LxdError::Other(anyhow!("Remote `{}` doesn't support projects", remote)),
                    || LxdError::ProjectAlreadyExists {
                        remote: remote.to_owned(),
                        project: project.name.to_owned(),
                    },
                )
            })?;

        Ok(())
    }

    fn update_project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
        body: &LxdProjectPut,
        etag: &LxdEtag,
    ) -> LxdResult<()> {
        let (_, current_etag) = self.project(remote, project)?;

        if &current_etag != etag {
            return Err(LxdError::EtagMismatch {
                remote: remote.to_owned(),
                object: format!("projects/{}", project),
            });
        }

        let body = Self::serialize(body)?;

        self.query("PUT", remote, &format!("/1.0/projects/{}", project), Some(body))
            .map_err(|err| {
                err.into_lxd(|| LxdError::NoSuchProject {
                    remote: remote.to_owned(),
                    project: project.to_owned(),
                })
            })?;

        Ok(())
    }

    fn delete_project(
        &mut self,
        remote: &LxdRemoteName,
        project: &LxdProjectName,
    ) -> LxdResult<()> {
        self.query("DELETE", remote, &format!("/1.0/projects/{}", project), None)
            .map_err(|err| {
                err.into_lxd(|| LxdError::NoSuchProject {
                    remote: remote.to_owned(),
                    project: project.to_owned(),
                })
            })?;

        Ok(())
    }
}

enum QueryError {
    /// `lxc` couldn't be launched or its output couldn't be read
    Failed(anyhow::Error),

    /// LXD refused the request; contains whatever `lxc` printed on stderr
    Rejected(String),
}

impl From<anyhow::Error> for QueryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(err)
    }
}

impl QueryError {
    fn into_lxd(self, not_found: impl FnOnce() -> LxdError) -> LxdError {
        self.into_lxd_ex(not_found, || {
            LxdError::Other(anyhow!("LXD reported a conflict"))
        })
    }

    fn into_lxd_ex(
        self,
        not_found: impl FnOnce() -> LxdError,
        already_exists: impl FnOnce() -> LxdError,
    ) -> LxdError {
        match self {
            Self::Failed(err) => LxdError::Other(err),

            Self::Rejected(stderr) => {
                let message = stderr.to_lowercase();

                if message.contains("not found") {
                    not_found()
                } else if message.contains("already exists") {
                    already_exists()
                } else {
                    LxdError::Other(anyhow!(
                        "lxc returned a non-zero status code and said: {}",
                        stderr
                    ))
                }
            }
        }
    }
}

/// Extracts profile's name out of an URL such as `/1.0/profiles/web?project=app`.
fn profile_name_from_url(url: &str) -> LxdProfileName {
    let path = url.split('?').next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);

    LxdProfileName::new(name)
}
