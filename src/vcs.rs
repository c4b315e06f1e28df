//! Repository listing via the hosting services' REST APIs.
//!
//! Each service implements the small [`VcsHost`] capability interface:
//! list the repositories under a project URL and build the canonical
//! clone URL for each name. The GitHub and Bitbucket Server calls are
//! near-identical HTTP GETs that differ only in endpoint shape and
//! response schema, so they share one fetch helper.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::{Credentials, Vcs};
use crate::error::ListingError;

/// Capability interface for a hosting service.
#[async_trait]
pub trait VcsHost {
    /// Service name for log lines.
    fn name(&self) -> &'static str;

    /// List the repository names under `project_url`.
    async fn list_repos(
        &self,
        client: &Client,
        project_url: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ListingError>;

    /// Canonical clone URL for one listed repository.
    fn clone_url(&self, project_url: &str, name: &str) -> Result<String, ListingError>;
}

/// Adapter for a config entry's service.
pub fn host_for(vcs: Vcs) -> &'static dyn VcsHost {
    match vcs {
        Vcs::Github => &GitHub,
        Vcs::Bitbucket => &Bitbucket,
    }
}

/// GitHub (github.com or GitHub Enterprise hosts): org repositories.
pub struct GitHub;

/// Bitbucket Server: workspace repositories.
pub struct Bitbucket;

#[derive(Deserialize)]
struct GitHubRepo {
    name: String,
}

#[derive(Deserialize)]
struct BitbucketRepo {
    slug: String,
}

#[derive(Deserialize)]
struct BitbucketListing {
    values: Vec<BitbucketRepo>,
}

fn parse_project(project_url: &str) -> Result<Url, ListingError> {
    Url::parse(project_url).map_err(|_| ListingError::InvalidProjectUrl(project_url.to_string()))
}

/// Path element at `index`, requiring the historical minimum of three
/// `/`-separated elements (a leading slash yields an empty element 0).
fn path_element(project: &Url, index: usize) -> Result<String, ListingError> {
    let parts: Vec<&str> = project.path().split('/').collect();
    if parts.len() < 3 {
        return Err(ListingError::InvalidProjectUrl(project.to_string()));
    }
    Ok(parts[index].to_string())
}

/// GET with basic auth; non-200 is a hard failure for the project entry.
async fn fetch_body(
    client: &Client,
    api_url: &str,
    credentials: &Credentials,
) -> Result<String, ListingError> {
    let response = client
        .get(api_url)
        .basic_auth(&credentials.username, Some(&credentials.password))
        .send()
        .await
        .map_err(|e| ListingError::Request {
            url: api_url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ListingError::Status {
            url: api_url.to_string(),
            status,
        });
    }

    response.text().await.map_err(|e| ListingError::Request {
        url: api_url.to_string(),
        source: e,
    })
}

impl GitHub {
    fn api_url(project: &Url) -> Result<String, ListingError> {
        let host = project
            .host_str()
            .ok_or_else(|| ListingError::InvalidProjectUrl(project.to_string()))?;
        let org = path_element(project, 1)?;
        Ok(format!("https://api.{}/repos/{}", host, org))
    }

    async fn fetch_names(
        client: &Client,
        api_url: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ListingError> {
        let body = fetch_body(client, api_url, credentials).await?;
        let repos: Vec<GitHubRepo> =
            serde_json::from_str(&body).map_err(|e| ListingError::Decode {
                url: api_url.to_string(),
                source: e,
            })?;
        Ok(repos.into_iter().map(|r| r.name).collect())
    }
}

#[async_trait]
impl VcsHost for GitHub {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_repos(
        &self,
        client: &Client,
        project_url: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ListingError> {
        let project = parse_project(project_url)?;
        let api_url = Self::api_url(&project)?;
        debug!(%api_url, "listing github repositories");
        Self::fetch_names(client, &api_url, credentials).await
    }

    fn clone_url(&self, project_url: &str, name: &str) -> Result<String, ListingError> {
        let project = parse_project(project_url)?;
        let org = path_element(&project, 1)?;
        Ok(format!("https://github.com/{}/{}.git", org, name))
    }
}

impl Bitbucket {
    fn api_url(project: &Url) -> Result<String, ListingError> {
        let host = project
            .host_str()
            .ok_or_else(|| ListingError::InvalidProjectUrl(project.to_string()))?;
        let workspace = path_element(project, 2)?;
        Ok(format!(
            "https://{}/rest/api/1.0/projects/{}/repos",
            host, workspace
        ))
    }

    async fn fetch_names(
        client: &Client,
        api_url: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ListingError> {
        let body = fetch_body(client, api_url, credentials).await?;
        let listing: BitbucketListing =
            serde_json::from_str(&body).map_err(|e| ListingError::Decode {
                url: api_url.to_string(),
                source: e,
            })?;
        Ok(listing.values.into_iter().map(|r| r.slug).collect())
    }
}

#[async_trait]
impl VcsHost for Bitbucket {
    fn name(&self) -> &'static str {
        "bitbucket"
    }

    async fn list_repos(
        &self,
        client: &Client,
        project_url: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ListingError> {
        let project = parse_project(project_url)?;
        let api_url = Self::api_url(&project)?;
        debug!(%api_url, "listing bitbucket repositories");
        Self::fetch_names(client, &api_url, credentials).await
    }

    fn clone_url(&self, project_url: &str, name: &str) -> Result<String, ListingError> {
        let project = parse_project(project_url)?;
        let host = project
            .host_str()
            .ok_or_else(|| ListingError::InvalidProjectUrl(project.to_string()))?;
        let workspace = path_element(&project, 2)?;
        Ok(format!(
            "ssh://git@{}:7999/{}/{}.git",
            host, workspace, name
        ))
    }
}
