//! In-process download subsystem: a job table, one worker thread per running
//! transfer, and a notification thread for listeners.

use super::control::JobControl;
use super::notify::{Event, Notifier};
use super::transfer::{download_to, TransferError};
use super::{DownloadId, DownloadManager, DownloadRecord, DownloadStatus, DownloadsListener};
use crate::config::TransferConfig;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

struct JobEntry {
    record: DownloadRecord,
    output_path: PathBuf,
}

struct Inner {
    /// Jobs in start order.
    jobs: Mutex<Vec<JobEntry>>,
    next_id: AtomicU64,
    control: JobControl,
    notifier: Notifier,
    transfer: TransferConfig,
}

/// Curl-backed [`DownloadManager`]. Cheap to clone; clones share the job table.
#[derive(Clone)]
pub struct CurlDownloadManager {
    inner: Arc<Inner>,
}

impl CurlDownloadManager {
    pub fn new(transfer: TransferConfig) -> Result<Self> {
        let notifier = Notifier::spawn().context("failed to spawn notification thread")?;
        Ok(CurlDownloadManager {
            inner: Arc::new(Inner {
                jobs: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                control: JobControl::default(),
                notifier,
                transfer,
            }),
        })
    }
}

impl Inner {
    fn snapshot(&self) -> Vec<DownloadRecord> {
        self.jobs.lock().iter().map(|j| j.record.clone()).collect()
    }

    fn publish_update(&self) {
        self.notifier.send(Event::Update(self.snapshot()));
    }

    /// Applies `f` to the job's record; `None` if the job was removed meanwhile.
    fn update_record(
        &self,
        id: DownloadId,
        f: impl FnOnce(&mut DownloadRecord),
    ) -> Option<DownloadRecord> {
        let mut jobs = self.jobs.lock();
        let entry = jobs.iter_mut().find(|j| j.record.id == id)?;
        f(&mut entry.record);
        Some(entry.record.clone())
    }

    fn run_job(&self, id: DownloadId, uri: &str, output: &Path, abort: &std::sync::atomic::AtomicBool) {
        if self
            .update_record(id, |r| r.status = DownloadStatus::InProgress)
            .is_none()
        {
            self.control.unregister(id);
            return;
        }
        self.publish_update();

        let result = download_to(uri, output, abort, &self.transfer);
        self.control.unregister(id);

        match result {
            Ok(bytes) => {
                let done = self.update_record(id, |r| {
                    r.status = DownloadStatus::Successful;
                    r.output_file = Some(output.to_path_buf());
                });
                match done {
                    Some(record) => {
                        tracing::info!(id = %id, uri, bytes, "download completed");
                        self.publish_update();
                        self.notifier.send(Event::Completed(record));
                    }
                    None => {
                        tracing::debug!(id = %id, "download removed while finishing; discarding payload");
                        remove_if_exists(output);
                    }
                }
            }
            Err(TransferError::Aborted) => {
                tracing::debug!(id = %id, uri, "download aborted");
            }
            Err(e) => {
                tracing::warn!(id = %id, uri, "download failed: {}", e);
                if self
                    .update_record(id, |r| r.status = DownloadStatus::Failed)
                    .is_some()
                {
                    self.publish_update();
                }
            }
        }
    }
}

fn remove_if_exists(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "deleted file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "could not delete file: {}", e),
    }
}

impl DownloadManager for CurlDownloadManager {
    fn list_jobs(&self) -> Vec<DownloadRecord> {
        self.inner.snapshot()
    }

    fn start_download(&self, uri: &str, output_path: &Path) -> Result<DownloadRecord> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let id = DownloadId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let record = DownloadRecord::new(id, uri);
        let abort = self.inner.control.register(id);
        self.inner.jobs.lock().push(JobEntry {
            record: record.clone(),
            output_path: output_path.to_path_buf(),
        });

        let inner = Arc::clone(&self.inner);
        let uri_owned = uri.to_string();
        let output = output_path.to_path_buf();
        let spawned = thread::Builder::new()
            .name(format!("dicprov-download-{}", id))
            .spawn(move || inner.run_job(id, &uri_owned, &output, &abort));
        if let Err(e) = spawned {
            self.inner.control.unregister(id);
            self.inner.jobs.lock().retain(|j| j.record.id != id);
            return Err(e).context("failed to spawn download worker");
        }

        tracing::debug!(id = %id, uri, output = %output_path.display(), "download started");
        self.inner.publish_update();
        Ok(record)
    }

    fn remove_download(&self, id: DownloadId, delete_artifact: bool) -> Result<()> {
        let removed = {
            let mut jobs = self.inner.jobs.lock();
            jobs.iter()
                .position(|j| j.record.id == id)
                .map(|pos| jobs.remove(pos))
        };
        let Some(entry) = removed else {
            tracing::debug!(id = %id, "remove_download: unknown job");
            return Ok(());
        };

        self.inner.control.request_abort(id);
        if delete_artifact {
            remove_if_exists(&entry.output_path);
        }
        tracing::debug!(id = %id, uri = %entry.record.uri, delete_artifact, "download removed");
        self.inner.publish_update();
        Ok(())
    }

    fn add_listener(&self, listener: Arc<dyn DownloadsListener>) {
        self.inner.notifier.add(listener);
    }

    fn remove_listener(&self, listener: &Arc<dyn DownloadsListener>) {
        self.inner.notifier.remove(listener);
    }
}
