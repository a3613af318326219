//! Boundary to the download subsystem.
//!
//! The provisioner issues commands through [`DownloadManager`] and receives
//! job updates through [`DownloadsListener`]. [`CurlDownloadManager`] is the
//! in-process implementation used by the CLI; tests substitute fakes.

mod control;
mod curl_manager;
mod notify;
mod transfer;
mod types;

pub use curl_manager::CurlDownloadManager;
pub use transfer::TransferError;
pub use types::{DownloadId, DownloadRecord, DownloadStatus};

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Commands accepted by a download subsystem.
pub trait DownloadManager: Send + Sync {
    /// Snapshot of every job the subsystem currently knows about.
    fn list_jobs(&self) -> Vec<DownloadRecord>;

    /// Starts fetching `uri` into `output_path`; the id is assigned here.
    fn start_download(&self, uri: &str, output_path: &Path) -> Result<DownloadRecord>;

    /// Forgets a job, stopping it if still running. With `delete_artifact`
    /// its output file is deleted too. Unknown ids are ignored.
    fn remove_download(&self, id: DownloadId, delete_artifact: bool) -> Result<()>;

    fn add_listener(&self, listener: Arc<dyn DownloadsListener>);

    fn remove_listener(&self, listener: &Arc<dyn DownloadsListener>);
}

/// Callbacks a download subsystem delivers, possibly from its own thread.
pub trait DownloadsListener: Send + Sync {
    /// The job list changed, for any reason and for any job.
    fn on_downloads_update(&self, jobs: &[DownloadRecord]);

    /// A job reached `Successful`. Delivered once per job.
    fn on_download_completed(&self, job: &DownloadRecord);
}

/// Identity comparison for registered listeners (data pointer only).
pub(crate) fn same_listener(a: &Arc<dyn DownloadsListener>, b: &Arc<dyn DownloadsListener>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// File name a job for `uri` writes under the download directory.
pub fn suggested_filename(uri: &str) -> String {
    crate::url_model::derive_filename(uri)
}
