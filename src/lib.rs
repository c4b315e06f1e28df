//! gitsync - Declarative Git Repository Synchronization
//!
//! gitsync keeps a local mirror tree in sync with a declarative list of
//! GitHub and Bitbucket repositories: project entries are expanded via the
//! hosting service's REST API, then every repository is cloned when absent
//! or fast-forward pulled when present, with an optional branch or tag
//! checkout.
//!
//! ## Core Features
//!
//! - **Clone-or-pull reconciliation**: directory existence drives a small,
//!   idempotent state machine
//! - **Credential resolution**: per-repo overrides, secret-manager shell
//!   commands, interactive prompts, default basic auth, and SSH keys
//! - **Project expansion**: GitHub org and Bitbucket workspace listing
//!   behind one capability interface
//! - **Append-only sync log**: a durable `gitsync.log` next to the clones
//!
//! ## Modules
//!
//! - [`config`]: repository list loading
//! - [`sync`]: the sync engine and dispatch loop

pub mod auth;
pub mod config;
pub mod error;
pub mod git;
pub mod journal;
pub mod layout;
pub mod sync;
pub mod vcs;

pub use config::{Config, Credentials, EntryKind, RepoEntry, Vcs};
pub use error::{ConfigError, ListingError, SyncError};
pub use sync::{SyncEngine, SyncOutcome, SyncSummary};
