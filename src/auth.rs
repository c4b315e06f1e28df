//! Credential resolution for clone, pull, and listing operations.
//!
//! A repository entry can carry its own user/password pair, the password
//! may be a shell command or the literal `ask`, and everything falls back
//! to the run-wide defaults or the conventional SSH key. The precedence
//! chain lives in [`resolve`]; the side-effecting pieces (subprocess,
//! terminal prompt) sit behind [`SecretProvider`] so tests can substitute
//! fixed values.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use dialoguer::Password;
use tracing::debug;

use crate::config::Credentials;
use crate::error::SyncError;

/// Authentication method chosen for one sync or listing call.
#[derive(Clone)]
pub enum AuthMethod {
    /// Username/password over http(s).
    Basic { username: String, password: String },
    /// Public key authentication for ssh remotes.
    SshKey { key_path: PathBuf },
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            AuthMethod::SshKey { key_path } => f
                .debug_struct("SshKey")
                .field("key_path", key_path)
                .finish(),
        }
    }
}

/// Source of secrets that require side effects to obtain.
pub trait SecretProvider {
    /// Run a shell command and return its trimmed standard output.
    fn password_command(&self, command: &str) -> Result<String, SyncError>;

    /// Ask the operator for a password on the controlling terminal.
    fn prompt_password(&self, url: &str, username: &str) -> Result<String, SyncError>;
}

/// Production [`SecretProvider`]: `sh -c` for commands, a hidden terminal
/// prompt for `ask`. Both block without a timeout.
pub struct SystemSecrets;

impl SecretProvider for SystemSecrets {
    fn password_command(&self, command: &str) -> Result<String, SyncError> {
        debug!("running password command");
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SyncError::Credential(format!("cannot run password command: {}", e)))?;

        if !output.status.success() {
            return Err(SyncError::Credential(format!(
                "password command exited with {}",
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn prompt_password(&self, url: &str, username: &str) -> Result<String, SyncError> {
        Password::new()
            .with_prompt(format!("Enter password for {} user {}", url, username))
            .interact()
            .map_err(|e| SyncError::Credential(format!("cannot read password: {}", e)))
    }
}

/// Resolve the authentication method for `url`.
///
/// Evaluated in order, first match wins:
/// 1. a repo password containing a space is a shell command whose output
///    is the effective password,
/// 2. the literal `ask` prompts on the terminal,
/// 3. a complete per-repo pair always beats the defaults,
/// 4. http(s) URLs use the default pair,
/// 5. ssh URLs use `~/.ssh/id_rsa`,
/// 6. anything else is unsupported.
pub fn resolve(
    url: &str,
    repo_user: Option<&str>,
    repo_password: Option<&str>,
    defaults: &Credentials,
    secrets: &dyn SecretProvider,
) -> Result<AuthMethod, SyncError> {
    let repo_user = repo_user.unwrap_or("");
    let mut password = repo_password.unwrap_or("").to_string();

    if password.contains(' ') {
        password = secrets.password_command(&password)?;
    }

    if password == "ask" {
        password = secrets.prompt_password(url, &defaults.username)?;
    }

    if !repo_user.is_empty() && !password.is_empty() {
        return Ok(AuthMethod::Basic {
            username: repo_user.to_string(),
            password,
        });
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(AuthMethod::Basic {
            username: defaults.username.clone(),
            password: defaults.password.clone(),
        });
    }

    if url.starts_with("git@") || url.starts_with("ssh://") {
        let home = dirs::home_dir().ok_or_else(|| SyncError::KeyLoad {
            path: PathBuf::from("~/.ssh/id_rsa"),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot determine home directory",
            ),
        })?;
        let key_path = home.join(".ssh").join("id_rsa");
        // Surface an unreadable key now rather than mid-transfer.
        std::fs::File::open(&key_path).map_err(|e| SyncError::KeyLoad {
            path: key_path.clone(),
            source: e,
        })?;
        return Ok(AuthMethod::SshKey { key_path });
    }

    Err(SyncError::UnsupportedScheme(url.to_string()))
}
