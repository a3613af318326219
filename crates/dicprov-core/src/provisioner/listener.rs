//! Download subsystem callbacks.

use super::{DictionaryState, Provisioner};
use crate::downloads::{DownloadRecord, DownloadStatus, DownloadsListener};

impl DownloadsListener for Provisioner {
    /// Re-attaches to a dictionary download already in flight, e.g. after the
    /// provisioner was (re)registered.
    fn on_downloads_update(&self, jobs: &[DownloadRecord]) {
        let mut session = self.session.lock();
        let found = jobs
            .iter()
            .filter(|job| !job.status.is_terminal() && !session.is_retired(job.id))
            .find_map(|job| {
                self.catalog
                    .resolve_by_payload(&job.uri)
                    .map(|descriptor| (descriptor.language_id.as_str(), job.id))
            });
        let Some((lang, id)) = found else {
            return;
        };

        let tracked = DictionaryState::Downloading { id };
        if session.state(lang) != tracked {
            tracing::debug!(lang, id = %id, "tracking dictionary download");
            session.set(lang, tracked);
        }
    }

    fn on_download_completed(&self, job: &DownloadRecord) {
        if job.status != DownloadStatus::Successful {
            tracing::debug!(id = %job.id, status = job.status.as_str(), "ignoring non-successful completion");
            return;
        }
        let Some(output) = job.output_file.as_deref() else {
            tracing::warn!(id = %job.id, uri = %job.uri, "download completed without an output file");
            return;
        };
        let Some(descriptor) = self.catalog.resolve_by_payload(&job.uri) else {
            return;
        };
        let lang = descriptor.language_id.as_str();

        {
            let mut session = self.session.lock();
            if session.is_retired(job.id) {
                tracing::debug!(lang, id = %job.id, "ignoring completion of a removed download");
                return;
            }
            session.set(lang, DictionaryState::Storing { id: job.id });
        }

        // Copy without the session lock; Storing keeps requests from
        // starting a second download meanwhile.
        let next = match self.persist_payload(descriptor, output) {
            Ok(bytes) => {
                tracing::info!(
                    lang,
                    id = %job.id,
                    bytes,
                    file = %descriptor.stored_file_name,
                    "stored downloaded dictionary"
                );
                DictionaryState::Stored
            }
            Err(e) => {
                tracing::error!(lang, id = %job.id, "failed to store downloaded dictionary: {:#}", e);
                DictionaryState::NotRequested
            }
        };
        let mut session = self.session.lock();
        session.set(lang, next);
        self.remove_job(&mut session, job.id);
    }
}
