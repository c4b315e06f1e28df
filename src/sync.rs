//! Sync Engine - clone-or-pull reconciliation over the repository list.
//!
//! This module provides the high-level orchestration: the dispatch loop
//! that expands project entries via the listing API, and the per-repository
//! state machine (absent → clone, present → pull, then an optional tag
//! checkout). Repositories are processed strictly one at a time in config
//! order; a failure is logged and skips only that repository.

use std::path::PathBuf;

use reqwest::Client;
use tracing::{error, info};

use crate::auth::{self, SecretProvider, SystemSecrets};
use crate::config::{Credentials, EntryKind, RepoEntry};
use crate::error::SyncError;
use crate::git::{self, PullOutcome};
use crate::journal::Journal;
use crate::layout;
use crate::vcs;

/// What a single repository sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Repository was cloned from scratch.
    Cloned,
    /// Existing working copy was fast-forwarded.
    Updated,
    /// Nothing to do; still a success.
    UpToDate,
}

/// Counters from a complete run.
#[derive(Debug, Default)]
pub struct SyncSummary {
    pub cloned: usize,
    pub updated: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn successful(&self) -> usize {
        self.cloned + self.updated + self.up_to_date
    }
}

/// The main sync engine: owns the base directory, the run-wide default
/// credentials, and the log artifact. The secret provider is injectable
/// so tests never shell out or prompt.
pub struct SyncEngine<S = SystemSecrets> {
    base_dir: PathBuf,
    defaults: Credentials,
    journal: Journal,
    client: Client,
    secrets: S,
}

impl SyncEngine<SystemSecrets> {
    pub fn new(base_dir: PathBuf, defaults: Credentials) -> Self {
        Self::with_secrets(base_dir, defaults, SystemSecrets)
    }
}

impl<S: SecretProvider> SyncEngine<S> {
    pub fn with_secrets(base_dir: PathBuf, defaults: Credentials, secrets: S) -> Self {
        let journal = Journal::new(&base_dir);
        Self {
            base_dir,
            defaults,
            journal,
            client: Client::new(),
            secrets,
        }
    }

    /// Process every entry in config order and report the counters.
    ///
    /// Listing and sync failures are logged and counted, never fatal: the
    /// run always continues with the next repository.
    pub async fn run(&self, entries: &[RepoEntry]) -> SyncSummary {
        let mut summary = SyncSummary::default();

        for entry in entries {
            match entry.kind {
                EntryKind::Project => self.sync_project(entry, &mut summary).await,
                EntryKind::Repo => self.sync_one(entry, &entry.url, &mut summary),
            }
        }

        summary
    }

    /// Expand one project entry via its listing API and sync each
    /// repository that survives the ignore filter.
    async fn sync_project(&self, entry: &RepoEntry, summary: &mut SyncSummary) {
        let host = vcs::host_for(entry.vcs);
        info!(project = %entry.url, service = host.name(), "processing project");
        self.journal
            .record(&format!("Processing project: {}", entry.url));

        let names = match host
            .list_repos(&self.client, &entry.url, &self.defaults)
            .await
        {
            Ok(names) => names,
            Err(e) => {
                error!(project = %entry.url, "listing failed: {}", e);
                self.journal
                    .record(&format!("Error listing project {}: {}", entry.url, e));
                summary.failed += 1;
                return;
            }
        };

        info!(project = %entry.url, count = names.len(), "found repositories");

        for name in names {
            if is_ignored(&name, &entry.ignore) {
                info!(repo = %name, "skipping ignored repository");
                self.journal.record(&format!("Skipping repository: {}", name));
                summary.skipped += 1;
                continue;
            }

            match host.clone_url(&entry.url, &name) {
                Ok(url) => self.sync_one(entry, &url, summary),
                Err(e) => {
                    error!(repo = %name, "cannot build clone URL: {}", e);
                    self.journal
                        .record(&format!("Error building clone URL for {}: {}", name, e));
                    summary.failed += 1;
                }
            }
        }
    }

    /// Sync one repository, routing the outcome into the counters.
    fn sync_one(&self, entry: &RepoEntry, url: &str, summary: &mut SyncSummary) {
        let result = self.sync_repository(
            url,
            entry.user.as_deref(),
            entry.password.as_deref(),
            entry.branch.as_deref(),
            entry.tag.as_deref(),
        );

        match result {
            Ok(SyncOutcome::Cloned) => summary.cloned += 1,
            Ok(SyncOutcome::Updated) => summary.updated += 1,
            Ok(SyncOutcome::UpToDate) => summary.up_to_date += 1,
            Err(e) => {
                error!(url, "sync failed: {}", e);
                self.journal
                    .record(&format!("Error syncing repository {}: {}", url, e));
                summary.failed += 1;
            }
        }
    }

    /// The clone-or-pull state machine for one remote URL.
    ///
    /// Directory existence is the sole state signal: absent → clone
    /// (single-branch if `branch` is set), present → open and
    /// fast-forward pull. A configured `tag` is checked out afterwards
    /// unless a branch was just applied by this call's clone. A failed
    /// checkout leaves the fresh clone in place.
    pub fn sync_repository(
        &self,
        url: &str,
        user: Option<&str>,
        password: Option<&str>,
        branch: Option<&str>,
        tag: Option<&str>,
    ) -> Result<SyncOutcome, SyncError> {
        let auth = auth::resolve(url, user, password, &self.defaults, &self.secrets)?;
        let dest = layout::clone_destination(&self.base_dir, url);

        let (repo, outcome, branch_applied) = if dest.exists() {
            info!(url, dest = %dest.display(), "pulling repository");
            self.journal.record(&format!("Pulling repository: {}", url));

            let repo = git2::Repository::open(&dest).map_err(|e| SyncError::Pull {
                url: url.to_string(),
                source: e,
            })?;
            let outcome = match git::pull(&repo, &auth).map_err(|e| SyncError::Pull {
                url: url.to_string(),
                source: e,
            })? {
                PullOutcome::FastForwarded => SyncOutcome::Updated,
                PullOutcome::UpToDate => SyncOutcome::UpToDate,
            };
            (repo, outcome, false)
        } else {
            info!(url, dest = %dest.display(), "cloning repository");
            self.journal.record(&format!("Cloning repository: {}", url));

            let repo = git::clone(url, &dest, &auth, branch).map_err(|e| SyncError::Clone {
                url: url.to_string(),
                source: e,
            })?;
            (repo, SyncOutcome::Cloned, branch.is_some())
        };

        if let Some(tag) = tag {
            if !branch_applied {
                info!(url, tag, "checking out tag");
                self.journal
                    .record(&format!("Checking out tag {} in {}", tag, url));
                git::checkout_tag(&repo, tag).map_err(|e| SyncError::Checkout {
                    reference: tag.to_string(),
                    source: e,
                })?;
            }
        }

        Ok(outcome)
    }
}

/// Substring containment, deliberately not exact match: an ignore entry
/// `b` also excludes a repository named `sub-b`. Some deployments rely
/// on this.
pub fn is_ignored(name: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| name.contains(pattern))
}
