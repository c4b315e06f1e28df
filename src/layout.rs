//! Local directory layout for synchronized repositories.
//!
//! Every remote URL maps to `<base>/<prefix>/<basename>` where the prefix
//! groups repositories of the same server and project. The mapping is a
//! pure function of the URL string: no network, no disk, and it never
//! fails — naming is cosmetic and must not abort a sync.

use std::path::{Path, PathBuf};

use url::Url;

/// Sentinel prefix for URLs the mapper cannot make sense of.
const UNKNOWN: &str = "unknown";

/// Derive the grouping prefix for a remote URL.
///
/// The prefix is `<subdomain>-<project>`: the first label of the host,
/// plus the second-to-last path element (for short paths, the first
/// element, which is empty for any path starting with `/`). Hosts with a
/// single label and unparsable URLs map to `"unknown"`.
pub fn clone_prefix(raw_url: &str) -> String {
    let Ok(url) = Url::parse(raw_url) else {
        return UNKNOWN.to_string();
    };

    let host = url.host_str().unwrap_or("");
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return UNKNOWN.to_string();
    }
    let subdomain = labels[0];

    // "/a/b/c" splits to ["", "a", "b", "c"]; the leading empty element
    // is part of the historical layout and must be preserved.
    let segments: Vec<&str> = url.path().split('/').collect();
    let project = if segments.len() >= 3 {
        segments[segments.len() - 2]
    } else {
        segments[0]
    };

    format!("{}-{}", subdomain, project)
}

/// Final path component of a URL, kept verbatim (a trailing `.git` stays
/// part of the on-disk directory name).
pub fn url_basename(raw_url: &str) -> String {
    raw_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(raw_url)
        .to_string()
}

/// Full local destination for a remote URL under `base`.
pub fn clone_destination(base: &Path, raw_url: &str) -> PathBuf {
    base.join(clone_prefix(raw_url)).join(url_basename(raw_url))
}
