//! Abort tokens for in-flight transfers.
//!
//! Each running job is registered with a token; removing the job sets it and
//! the transfer's progress callback stops the download at the next tick.

use super::DownloadId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub(super) struct JobControl {
    jobs: RwLock<HashMap<DownloadId, Arc<AtomicBool>>>,
}

impl JobControl {
    /// Register a job; returns the token its transfer must poll.
    pub(super) fn register(&self, id: DownloadId) -> Arc<AtomicBool> {
        let token = Arc::new(AtomicBool::new(false));
        self.jobs.write().insert(id, Arc::clone(&token));
        token
    }

    /// Forget a job (transfer finished or job removed).
    pub(super) fn unregister(&self, id: DownloadId) {
        self.jobs.write().remove(&id);
    }

    /// Ask the job's transfer to stop. No-op for unknown ids.
    pub(super) fn request_abort(&self, id: DownloadId) {
        if let Some(token) = self.jobs.read().get(&id) {
            token.store(true, Ordering::Relaxed);
        }
    }
}
