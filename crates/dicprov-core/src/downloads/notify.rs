//! Listener registry and the notification thread.
//!
//! Events are queued on a channel and delivered from a single dedicated
//! thread, in order. Commands never call listeners inline, so a listener may
//! call back into the manager while holding its own locks.

use super::{same_listener, DownloadRecord, DownloadsListener};
use parking_lot::{Mutex, RwLock};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(super) enum Event {
    Update(Vec<DownloadRecord>),
    Completed(DownloadRecord),
}

type Listeners = Arc<RwLock<Vec<Arc<dyn DownloadsListener>>>>;

pub(super) struct Notifier {
    listeners: Listeners,
    tx: Mutex<Option<mpsc::Sender<Event>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Notifier {
    pub(super) fn spawn() -> std::io::Result<Self> {
        let listeners: Listeners = Arc::new(RwLock::new(Vec::new()));
        let (tx, rx) = mpsc::channel::<Event>();
        let thread_listeners = Arc::clone(&listeners);
        let handle = thread::Builder::new()
            .name("dicprov-notify".to_string())
            .spawn(move || {
                for event in rx {
                    // Snapshot so listeners may (un)register from a callback.
                    let current: Vec<_> = thread_listeners.read().clone();
                    for listener in &current {
                        match &event {
                            Event::Update(jobs) => listener.on_downloads_update(jobs),
                            Event::Completed(job) => listener.on_download_completed(job),
                        }
                    }
                }
                tracing::debug!("notification thread stopped");
            })?;
        Ok(Notifier {
            listeners,
            tx: Mutex::new(Some(tx)),
            thread: Mutex::new(Some(handle)),
        })
    }

    pub(super) fn add(&self, listener: Arc<dyn DownloadsListener>) {
        let mut listeners = self.listeners.write();
        if !listeners.iter().any(|l| same_listener(l, &listener)) {
            listeners.push(listener);
        }
    }

    pub(super) fn remove(&self, listener: &Arc<dyn DownloadsListener>) {
        self.listeners.write().retain(|l| !same_listener(l, listener));
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub(super) fn send(&self, event: Event) {
        if let Some(tx) = self.tx.lock().as_ref() {
            if tx.send(event).is_err() {
                tracing::warn!("notification thread is gone; dropping event");
            }
        }
    }

    /// Drains queued events and stops the thread.
    pub(super) fn shutdown(&self) {
        self.tx.lock().take();
        if let Some(handle) = self.thread.lock().take() {
            // Never join ourselves (last handle dropped from a callback).
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.shutdown();
    }
}
