//! Error types for gitsync.
//!
//! Three tiers match the blast radius of a failure: [`ConfigError`] aborts
//! the run, [`ListingError`] skips one project entry, [`SyncError`] skips
//! one repository. The outer loop logs and keeps going for the last two.

use std::path::PathBuf;

use thiserror::Error;

/// Errors loading the repository list. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Errors listing a project's repositories. Skips that project entry.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The project URL is missing the host or path components the API
    /// endpoint is derived from.
    #[error("invalid project URL '{0}'")]
    InvalidProjectUrl(String),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    /// The listing API answered with a non-200 status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("cannot decode repository listing from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

/// Errors synchronizing a single repository. Skips that repository.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The URL is neither http(s) nor ssh, so no credential applies.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// The SSH key at the conventional location is missing or unreadable.
    #[error("cannot load SSH key '{path}': {source}")]
    KeyLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A password command or interactive prompt failed.
    #[error("credential lookup failed: {0}")]
    Credential(String),

    #[error("clone of {url} failed: {source}")]
    Clone { url: String, source: git2::Error },

    /// Covers opening the existing working copy as well as the
    /// fetch/fast-forward itself.
    #[error("pull of {url} failed: {source}")]
    Pull { url: String, source: git2::Error },

    #[error("checkout of '{reference}' failed: {source}")]
    Checkout {
        reference: String,
        source: git2::Error,
    },
}
