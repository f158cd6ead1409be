use crate::lxd::{LxdProfileName, LxdProjectName, LxdRemoteName};
use std::result;
use thiserror::Error;

pub type LxdResult<T> = result::Result<T, LxdError>;

#[derive(Debug, Error)]
pub enum LxdError {
    #[error("No such profile: {} (in project `{project}`)", .profile.on(.remote))]
    NoSuchProfile {
        remote: LxdRemoteName,
        project: LxdProjectName,
        profile: LxdProfileName,
    },

    #[error("No such project: {remote}:{project}")]
    NoSuchProject {
        remote: LxdRemoteName,
        project: LxdProjectName,
    },

    #[error("Profile already exists: {} (in project `{project}`)", .profile.on(.remote))]
    ProfileAlreadyExists {
        remote: LxdRemoteName,
        project: LxdProjectName,
        profile: LxdProfileName,
    },

    #[error("Project already exists: {remote}:{project}")]
    ProjectAlreadyExists {
        remote: LxdRemoteName,
        project: LxdProjectName,
    },

    #[error("`{object}` on `{remote}` has been modified concurrently (etag mismatch)")]
    EtagMismatch {
        remote: LxdRemoteName,
        object: String,
    },

    #[cfg(test)]
    #[error("InjectedError")]
    InjectedError,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LxdError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchProfile { .. } | Self::NoSuchProject { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::EtagMismatch { .. })
    }
}

#[cfg(test)]
impl PartialEq<LxdError> for LxdError {
    fn eq(&self, other: &LxdError) -> bool {
        self.to_string() == other.to_string()
    }
}
