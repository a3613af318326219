//! Download job records as reported by the download subsystem.

use std::fmt;
use std::path::PathBuf;

/// Identifier assigned by the download subsystem when a job is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DownloadId(pub u64);

impl fmt::Display for DownloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Pending,
    InProgress,
    Successful,
    Failed,
}

impl DownloadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DownloadStatus::Successful | DownloadStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DownloadStatus::Pending => "pending",
            DownloadStatus::InProgress => "in-progress",
            DownloadStatus::Successful => "successful",
            DownloadStatus::Failed => "failed",
        }
    }
}

/// Snapshot of one job. Owned by the download subsystem; other components
/// only keep the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    pub id: DownloadId,
    pub uri: String,
    pub status: DownloadStatus,
    /// Set once the payload has been fully written.
    pub output_file: Option<PathBuf>,
}

impl DownloadRecord {
    pub fn new(id: DownloadId, uri: &str) -> Self {
        Self {
            id,
            uri: uri.to_string(),
            status: DownloadStatus::Pending,
            output_file: None,
        }
    }
}
