use crate::lxd::LxdProjectName;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};
use std::collections::BTreeMap;

/// Project as returned by `GET /1.0/projects/<name>`.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LxdProject {
    pub name: LxdProjectName,

    #[serde(default)]
    pub description: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub config: BTreeMap<String, String>,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub used_by: Vec<String>,
}

impl LxdProject {
    pub fn to_put(&self) -> LxdProjectPut {
        LxdProjectPut {
            description: self.description.clone(),
            config: self.config.clone(),
        }
    }
}

/// Body of `PUT /1.0/projects/<name>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LxdProjectPut {
    pub description: String,
    pub config: BTreeMap<String, String>,
}

/// Body of `POST /1.0/projects`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LxdProjectsPost {
    pub name: LxdProjectName,

    #[serde(flatten)]
    pub project: LxdProjectPut,
}
