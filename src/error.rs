// ABOUTME: Stage-level error types for the backup run
// ABOUTME: One variant per pipeline stage so callers can tell fatal from skippable failures

use std::fmt;

#[derive(Debug)]
pub enum BackupError {
    /// Table discovery failed; the run aborts before any archive or remote call.
    Discovery(String),
    /// A single table could not be fetched; the table is skipped, the run continues.
    Fetch(String),
    /// The local archive could not be written or finalized; fatal.
    Archive(String),
    /// A stale remote backup could not be deleted; logged, rotation continues.
    Delete(String),
    /// The finalized archive could not be persisted remotely; fatal, local copy retained.
    Upload(String),
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackupError::Discovery(msg) => write!(f, "Discovery error: {}", msg),
            BackupError::Fetch(msg) => write!(f, "Fetch error: {}", msg),
            BackupError::Archive(msg) => write!(f, "Archive error: {}", msg),
            BackupError::Delete(msg) => write!(f, "Delete error: {}", msg),
            BackupError::Upload(msg) => write!(f, "Upload error: {}", msg),
        }
    }
}

impl std::error::Error for BackupError {}
