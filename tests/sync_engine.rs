mod common;

use gitsync::{Credentials, EntryKind, RepoEntry, SyncEngine, SyncError, SyncOutcome, Vcs};
use tempfile::TempDir;

/// Engine over a fresh base directory plus a fixture origin repository,
/// addressed by its local path.
fn fixture() -> (TempDir, TempDir, String) {
    let origin_dir = TempDir::new().unwrap();
    let base_dir = TempDir::new().unwrap();
    common::init_origin(origin_dir.path());
    let url = origin_dir.path().to_string_lossy().to_string();
    (origin_dir, base_dir, url)
}

fn engine(base_dir: &TempDir) -> SyncEngine {
    SyncEngine::new(base_dir.path().to_path_buf(), Credentials::default())
}

fn sync(
    engine: &SyncEngine,
    url: &str,
    branch: Option<&str>,
    tag: Option<&str>,
) -> Result<SyncOutcome, SyncError> {
    engine.sync_repository(url, Some("fixture"), Some("fixture-pass"), branch, tag)
}

/// Local fixture paths fail the URL parse, so they group under "unknown".
fn clone_dir(base_dir: &TempDir, url: &str) -> std::path::PathBuf {
    let basename = url.rsplit('/').next().unwrap();
    base_dir.path().join("unknown").join(basename)
}

#[test]
fn test_first_sync_clones_second_sync_is_up_to_date() {
    let (_origin, base, url) = fixture();
    let engine = engine(&base);

    let outcome = sync(&engine, &url, None, None).unwrap();
    assert_eq!(outcome, SyncOutcome::Cloned);

    let dest = clone_dir(&base, &url);
    assert!(dest.join(".git").exists());
    assert_eq!(std::fs::read_to_string(dest.join("README.md")).unwrap(), "hello");

    // No remote changes in between: the pull must succeed, not error.
    let outcome = sync(&engine, &url, None, None).unwrap();
    assert_eq!(outcome, SyncOutcome::UpToDate);
}

#[test]
fn test_pull_fast_forwards_new_commits() {
    let (origin, base, url) = fixture();
    let engine = engine(&base);

    sync(&engine, &url, None, None).unwrap();

    let origin_repo = git2::Repository::open(origin.path()).unwrap();
    common::commit_file(&origin_repo, "new-file.txt", "fresh", "second commit");

    let outcome = sync(&engine, &url, None, None).unwrap();
    assert_eq!(outcome, SyncOutcome::Updated);

    let dest = clone_dir(&base, &url);
    assert_eq!(
        std::fs::read_to_string(dest.join("new-file.txt")).unwrap(),
        "fresh"
    );
}

#[test]
fn test_tag_checkout_detaches_at_the_tagged_commit() {
    let (origin, base, url) = fixture();
    let engine = engine(&base);

    let origin_repo = git2::Repository::open(origin.path()).unwrap();
    common::tag_head(&origin_repo, "v1.0");
    common::commit_file(&origin_repo, "later.txt", "after tag", "post-tag commit");

    let outcome = sync(&engine, &url, None, Some("v1.0")).unwrap();
    assert_eq!(outcome, SyncOutcome::Cloned);

    let local = git2::Repository::open(clone_dir(&base, &url)).unwrap();
    assert!(local.head_detached().unwrap());
    // The working tree is at the tag, before the later commit.
    assert!(!clone_dir(&base, &url).join("later.txt").exists());
}

#[test]
fn test_missing_tag_fails_but_the_clone_stays() {
    let (_origin, base, url) = fixture();
    let engine = engine(&base);

    let result = sync(&engine, &url, None, Some("v9.9"));
    assert!(matches!(result, Err(SyncError::Checkout { .. })));

    // The clone itself is not rolled back.
    assert!(clone_dir(&base, &url).join(".git").exists());
}

#[test]
fn test_branch_limited_clone_fetches_only_that_branch() {
    let (origin, base, url) = fixture();
    let engine = engine(&base);

    let origin_repo = git2::Repository::open(origin.path()).unwrap();
    common::branch_at_head(&origin_repo, "feature");
    common::commit_file(&origin_repo, "main-only.txt", "main moved on", "main commit");

    let outcome = sync(&engine, &url, Some("feature"), None).unwrap();
    assert_eq!(outcome, SyncOutcome::Cloned);

    let local = git2::Repository::open(clone_dir(&base, &url)).unwrap();
    assert_eq!(local.head().unwrap().shorthand(), Some("feature"));
    assert!(local
        .find_branch("origin/feature", git2::BranchType::Remote)
        .is_ok());
    assert!(local
        .find_branch("origin/main", git2::BranchType::Remote)
        .is_err());
    assert!(!clone_dir(&base, &url).join("main-only.txt").exists());
}

#[test]
fn test_branch_applied_at_clone_suppresses_the_tag_checkout() {
    let (origin, base, url) = fixture();
    let engine = engine(&base);

    let origin_repo = git2::Repository::open(origin.path()).unwrap();
    common::branch_at_head(&origin_repo, "feature");

    // The tag does not even exist; the checkout is skipped, so no error.
    let outcome = sync(&engine, &url, Some("feature"), Some("v9.9")).unwrap();
    assert_eq!(outcome, SyncOutcome::Cloned);

    let local = git2::Repository::open(clone_dir(&base, &url)).unwrap();
    assert_eq!(local.head().unwrap().shorthand(), Some("feature"));
}

#[test]
fn test_existing_non_repo_directory_surfaces_the_open_error() {
    let (_origin, base, url) = fixture();
    let engine = engine(&base);

    // The destination exists but is not a repository; the engine never
    // reinitializes it.
    let dest = clone_dir(&base, &url);
    std::fs::create_dir_all(&dest).unwrap();
    std::fs::write(dest.join("junk.txt"), "not a repo").unwrap();

    let result = sync(&engine, &url, None, None);
    assert!(matches!(result, Err(SyncError::Pull { .. })));
    assert!(dest.join("junk.txt").exists());
}

#[tokio::test]
async fn test_run_counts_outcomes_and_writes_the_log() {
    let (_origin, base, url) = fixture();
    let engine = engine(&base);

    let entries = vec![common::repo_entry(&url)];
    let summary = engine.run(&entries).await;
    assert_eq!(summary.cloned, 1);
    assert_eq!(summary.failed, 0);

    let summary = engine.run(&entries).await;
    assert_eq!(summary.up_to_date, 1);

    let log = std::fs::read_to_string(base.path().join("gitsync.log")).unwrap();
    assert!(log.contains(&format!("Cloning repository: {}", url)));
    assert!(log.contains(&format!("Pulling repository: {}", url)));
}

#[tokio::test]
async fn test_one_failing_entry_does_not_abort_the_rest() {
    let (_origin, base, url) = fixture();
    let engine = engine(&base);

    let bad = RepoEntry {
        vcs: Vcs::Github,
        kind: EntryKind::Repo,
        url: "ftp://example.com/a/b.git".to_string(),
        ignore: Vec::new(),
        user: None,
        password: None,
        branch: None,
        tag: None,
    };
    let entries = vec![bad, common::repo_entry(&url)];

    let summary = engine.run(&entries).await;
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.cloned, 1);
    assert!(clone_dir(&base, &url).join(".git").exists());
}
