//! Configuration: the declarative repository list.
//!
//! The config file is YAML with a single `repos` list. Entries are either
//! whole projects (a GitHub org or Bitbucket workspace, expanded via the
//! listing API) or single repository URLs. Everything is immutable after
//! loading; run-wide defaults travel in [`Credentials`] rather than any
//! process-wide state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Main configuration structure for gitsync.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// Repository list, processed strictly in order.
    #[serde(default)]
    pub repos: Vec<RepoEntry>,
}

/// Hosting service behind a config entry.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Vcs {
    Github,
    Bitbucket,
}

/// Whether an entry names a whole project or a single repository.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Project,
    Repo,
}

/// One entry of the repository list.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RepoEntry {
    pub vcs: Vcs,

    #[serde(rename = "type")]
    pub kind: EntryKind,

    /// Project URL for `project` entries, clone URL for `repo` entries.
    pub url: String,

    /// Substring patterns; a listed repository whose name contains any of
    /// them is skipped.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Per-repository username override.
    pub user: Option<String>,

    /// Per-repository password: a literal, a shell command (recognized by
    /// containing a space), or the literal `ask` for an interactive prompt.
    pub password: Option<String>,

    /// Restrict the clone to this branch.
    pub branch: Option<String>,

    /// Check the working tree out to this tag after syncing.
    pub tag: Option<String>,
}

/// Default credentials taken from the command line, used for listing APIs
/// and for http(s) remotes without a per-repo override.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Config {
    /// Load the repository list from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
