//! Low-level git operations via `git2`.
//!
//! The sync engine decides *what* to do; this module knows *how*: full
//! clones (optionally restricted to one branch), fast-forward pulls from
//! `origin`, and tag checkouts. Credentials arrive as a resolved
//! [`AuthMethod`] and are handed to libgit2 through its callback
//! machinery.

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Cred, FetchOptions, ObjectType, RemoteCallbacks, Repository};
use tracing::debug;

use crate::auth::AuthMethod;

/// Outcome of a pull against an existing working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// The local branch was fast-forwarded to the remote head.
    FastForwarded,
    /// Nothing to fetch or merge. Success, never an error.
    UpToDate,
}

/// Build libgit2 credential callbacks from a resolved auth method.
fn remote_callbacks(auth: &AuthMethod) -> RemoteCallbacks<'static> {
    let auth = auth.clone();
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, _allowed| match &auth {
        AuthMethod::Basic { username, password } => Cred::userpass_plaintext(username, password),
        AuthMethod::SshKey { key_path } => {
            Cred::ssh_key(username_from_url.unwrap_or("git"), None, key_path, None)
        }
    });
    callbacks
}

/// Clone `url` into `dest`.
///
/// With `branch`, the remote is created with a fetch refspec covering only
/// that branch, so no history for other branches is transferred, and the
/// working tree is checked out at it.
pub fn clone(
    url: &str,
    dest: &Path,
    auth: &AuthMethod,
    branch: Option<&str>,
) -> Result<Repository, git2::Error> {
    debug!(url, dest = %dest.display(), "cloning");

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(remote_callbacks(auth));

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    if let Some(branch) = branch {
        builder.branch(branch);
        let refspec = format!("+refs/heads/{0}:refs/remotes/origin/{0}", branch);
        builder.remote_create(move |repo, name, url| repo.remote_with_fetch(name, url, &refspec));
    }

    builder.clone(url, dest)
}

/// Fetch `origin` and fast-forward the checked-out branch.
///
/// "Already up to date" is reported as [`PullOutcome::UpToDate`], not an
/// error. Anything that would need a real merge fails: divergent history
/// is not repaired here.
pub fn pull(repo: &Repository, auth: &AuthMethod) -> Result<PullOutcome, git2::Error> {
    {
        let mut remote = repo.find_remote("origin")?;
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(auth));
        // An empty refspec list fetches the remote's configured refspecs.
        remote.fetch(&[] as &[&str], Some(&mut fetch_options), None)?;
    }

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;
    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        debug!("already up to date");
        return Ok(PullOutcome::UpToDate);
    }

    if analysis.is_fast_forward() {
        let refname = repo.head()?.name().unwrap_or("HEAD").to_string();
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(fetch_commit.id(), "gitsync: fast-forward")?;
        repo.set_head(&refname)?;
        repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
        return Ok(PullOutcome::FastForwarded);
    }

    Err(git2::Error::from_str(
        "local history has diverged from origin; only fast-forward updates are supported",
    ))
}

/// Check the working tree out at a tag, leaving HEAD detached.
///
/// The tag must be resolvable from the already-fetched references; a
/// branch-limited clone that never transferred the tag fails here.
pub fn checkout_tag(repo: &Repository, tag: &str) -> Result<(), git2::Error> {
    let refname = format!("refs/tags/{}", tag);
    let object = repo.revparse_single(&refname)?;
    let commit = object.peel(ObjectType::Commit)?;
    repo.checkout_tree(&commit, Some(CheckoutBuilder::default().force()))?;
    repo.set_head_detached(commit.id())?;
    Ok(())
}
