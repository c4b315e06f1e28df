/// Common test utilities and helpers for gitsync tests
use std::path::Path;

use git2::{Commit, Oid, Repository, Signature};

use gitsync::{EntryKind, RepoEntry, Vcs};

/// Create an origin repository with an initial commit on `main`.
pub fn init_origin(path: &Path) -> Repository {
    let mut opts = git2::RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(path, &opts).expect("Failed to init origin repo");
    commit_file(&repo, "README.md", "hello", "initial commit");
    repo
}

/// Write a file into the working tree and commit it on HEAD.
pub fn commit_file(repo: &Repository, name: &str, contents: &str, message: &str) -> Oid {
    let workdir = repo.workdir().expect("origin repo must have a workdir");
    std::fs::write(workdir.join(name), contents).expect("Failed to write fixture file");

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree_oid = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_oid).unwrap();

    let sig = Signature::now("Fixture", "fixture@example.com").unwrap();
    let parent = repo.head().ok().map(|head| head.peel_to_commit().unwrap());
    let parents: Vec<&Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Create a branch named `branch` at the current HEAD commit.
pub fn branch_at_head(repo: &Repository, branch: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.branch(branch, &head, false).unwrap();
}

/// Create a lightweight tag at the current HEAD commit.
pub fn tag_head(repo: &Repository, tag: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.tag_lightweight(tag, head.as_object(), false).unwrap();
}

/// A single-repo config entry pointing at a local fixture path.
///
/// Per-repo credentials are set so resolution short-circuits before the
/// URL scheme checks; local transports never consult them.
pub fn repo_entry(url: &str) -> RepoEntry {
    RepoEntry {
        vcs: Vcs::Github,
        kind: EntryKind::Repo,
        url: url.to_string(),
        ignore: Vec::new(),
        user: Some("fixture".to_string()),
        password: Some("fixture-pass".to_string()),
        branch: None,
        tag: None,
    }
}
