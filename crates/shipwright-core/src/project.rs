//! Project, repository and pipeline-definition types.

use serde::{Deserialize, Serialize};

/// A `${key}`/value substitution pair.
///
/// Variables live in an ordered list; key uniqueness is only enforced by the
/// explicit override-merge logic, never automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Source repository settings for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repo {
    /// Directory name under the workspace root; also names the credential
    /// file.
    pub name: String,
    pub url: String,
    pub branch: String,
    /// Raw credential material written to the per-repo key file.
    pub ssh_key: String,
}

/// One step of the project-defined pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStep {
    pub title: Option<String>,
    pub command: String,
    #[serde(default)]
    pub ignore_if_fail: bool,
}

/// A buildable project: repository plus ordered variables and run steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub repo: Repo,
    #[serde(default)]
    pub vars: Vec<Variable>,
    pub run: Vec<RunStep>,
}
