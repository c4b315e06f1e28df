//! Append-only sync log.
//!
//! Every operation appends one line to `gitsync.log` in the base
//! directory. The file handle is opened and released around each record,
//! so a crash mid-run loses at most the line being written. The journal
//! is purely observational: write failures degrade to a console warning
//! and never fail a sync.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

/// File name of the log artifact inside the base directory.
pub const LOG_FILE: &str = "gitsync.log";

/// Writer for the shared append-only log.
#[derive(Debug, Clone)]
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            path: base_dir.join(LOG_FILE),
        }
    }

    /// Append one line, creating the file on first use.
    pub fn record(&self, line: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}", line));

        if let Err(e) = result {
            warn!(path = %self.path.display(), "cannot write sync log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_append_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let journal = Journal::new(dir.path());
        journal.record("Cloning repository: a");

        // A second journal against the same base dir appends, not truncates.
        let journal = Journal::new(dir.path());
        journal.record("Pulling repository: b");

        let contents = std::fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        assert_eq!(contents, "Cloning repository: a\nPulling repository: b\n");
    }

    #[test]
    fn test_unwritable_path_does_not_panic() {
        let journal = Journal::new(Path::new("/nonexistent-gitsync-test"));
        journal.record("dropped on the floor");
    }
}
