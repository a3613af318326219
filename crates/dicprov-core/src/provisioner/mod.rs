//! Dictionary provisioner: turns a language id into a local dictionary file.
//!
//! Builtin dictionaries are materialized from the bundled assets on first
//! use. External ones are fetched through the download subsystem; the
//! provisioner tracks at most one in-flight dictionary download, persists
//! the payload into the store when the subsystem reports completion, and
//! abandons a pending download when a different language is requested.
//!
//! Failures never reach the caller: they are logged and show up only as
//! a missing dictionary on the next request.

mod listener;
mod state;

pub use state::DictionaryState;

use crate::catalog::{Catalog, DictionaryDescriptor, DictionarySource};
use crate::checksum;
use crate::config::DicprovConfig;
use crate::downloads::{suggested_filename, DownloadId, DownloadManager, DownloadStatus, DownloadsListener};
use crate::store::{copy_into_store, LocalStore, DEFAULT_COPY_BUFFER};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use state::Session;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Knobs the provisioner needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct ProvisionerOptions {
    /// Directory download jobs write their payloads to.
    pub download_dir: PathBuf,
    /// Prefix of builtin dictionaries inside the bundled assets.
    pub builtin_asset_prefix: String,
    pub copy_buffer_bytes: usize,
}

impl ProvisionerOptions {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            builtin_asset_prefix: "dictionaries/".to_string(),
            copy_buffer_bytes: DEFAULT_COPY_BUFFER,
        }
    }

    pub fn from_config(cfg: &DicprovConfig) -> Result<Self> {
        Ok(Self {
            download_dir: cfg.resolve_download_dir()?,
            builtin_asset_prefix: cfg.builtin_asset_prefix.clone(),
            copy_buffer_bytes: cfg.copy_buffer_bytes,
        })
    }
}

/// Outcome of a provisioning request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provision {
    /// Dictionary is available at this path.
    Ready(PathBuf),
    /// Builtin path returned although some bundled assets could not be
    /// materialized.
    Degraded { path: PathBuf, missing: Vec<String> },
    /// External dictionary not stored yet; a download is underway.
    Pending,
    /// Language not in the catalog.
    Unknown,
}

impl Provision {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Provision::Ready(path) | Provision::Degraded { path, .. } => Some(path),
            Provision::Pending | Provision::Unknown => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Provision::Ready(path) | Provision::Degraded { path, .. } => Some(path),
            Provision::Pending | Provision::Unknown => None,
        }
    }
}

pub struct Provisioner {
    catalog: Arc<Catalog>,
    downloads: Arc<dyn DownloadManager>,
    store: Arc<dyn LocalStore>,
    options: ProvisionerOptions,
    session: Mutex<Session>,
    /// Serializes builtin materialization without holding the session lock.
    materialize: Mutex<()>,
    registered: AtomicBool,
}

impl Provisioner {
    pub fn new(
        catalog: Arc<Catalog>,
        downloads: Arc<dyn DownloadManager>,
        store: Arc<dyn LocalStore>,
        options: ProvisionerOptions,
    ) -> Arc<Self> {
        Arc::new(Provisioner {
            catalog,
            downloads,
            store,
            options,
            session: Mutex::new(Session::default()),
            materialize: Mutex::new(()),
            registered: AtomicBool::new(false),
        })
    }

    /// Starts listening to the download subsystem. Pair with [`Provisioner::end`].
    pub fn init(self: &Arc<Self>) {
        if self.registered.swap(true, Ordering::SeqCst) {
            tracing::warn!("provisioner already registered as downloads listener");
            return;
        }
        let listener: Arc<dyn DownloadsListener> = Arc::clone(self) as Arc<dyn DownloadsListener>;
        self.downloads.add_listener(listener);
        tracing::debug!("provisioner registered as downloads listener");
    }

    /// Stops listening. The subsystem's reference to the provisioner is released.
    pub fn end(self: &Arc<Self>) {
        if !self.registered.swap(false, Ordering::SeqCst) {
            tracing::warn!("provisioner end() without matching init()");
            return;
        }
        let listener: Arc<dyn DownloadsListener> = Arc::clone(self) as Arc<dyn DownloadsListener>;
        self.downloads.remove_listener(&listener);
        tracing::debug!("provisioner unregistered as downloads listener");
    }

    /// Path of the dictionary for `lang`, or `None` if it is not available
    /// (yet). For an external dictionary that is missing, a download is
    /// started as a side effect; call again after it completes.
    pub fn get_or_download(&self, lang: &str) -> Option<PathBuf> {
        self.provision(lang).into_path()
    }

    /// Same as [`Provisioner::get_or_download`], distinguishing degraded
    /// builtin results and pending downloads from unknown languages.
    pub fn provision(&self, lang: &str) -> Provision {
        let Some(descriptor) = self.catalog.resolve(lang) else {
            tracing::debug!(lang, "no dictionary for language");
            return Provision::Unknown;
        };
        match &descriptor.source {
            DictionarySource::Builtin { asset_names } => self.materialize_builtin(lang, asset_names),
            DictionarySource::External { .. } => self.provision_external(descriptor),
        }
    }

    pub fn state(&self, lang: &str) -> DictionaryState {
        self.session.lock().state(lang)
    }

    /// Id of the download currently associated with the last external request.
    pub fn tracked_download(&self) -> Option<DownloadId> {
        self.session.lock().tracked().map(|(_, id)| id)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn materialize_builtin(&self, lang: &str, asset_names: &[String]) -> Provision {
        let _guard = self.materialize.lock();
        let mut missing = Vec::new();
        for name in asset_names {
            if self.store.exists(name) {
                continue;
            }
            let asset = format!("{}{}", self.options.builtin_asset_prefix, name);
            let copied = self
                .store
                .open_bundled_asset(&asset)
                .with_context(|| format!("open bundled asset {}", asset))
                .and_then(|reader| {
                    copy_into_store(reader, self.store.as_ref(), name, self.options.copy_buffer_bytes)
                });
            match copied {
                Ok(bytes) => tracing::info!(lang, asset = %asset, bytes, "materialized builtin dictionary"),
                Err(e) => {
                    tracing::error!(lang, asset = %asset, "failed to materialize builtin dictionary: {:#}", e);
                    missing.push(name.clone());
                }
            }
        }

        let path = self.store.root();
        if missing.is_empty() {
            Provision::Ready(path)
        } else {
            tracing::warn!(lang, ?missing, "builtin dictionary only partially available");
            Provision::Degraded { path, missing }
        }
    }

    fn provision_external(&self, descriptor: &DictionaryDescriptor) -> Provision {
        let lang = descriptor.language_id.as_str();
        let mut session = self.session.lock();

        if self.store.exists(&descriptor.stored_file_name) {
            if session.state(lang) == DictionaryState::NotRequested {
                session.set(lang, DictionaryState::Stored);
            }
            return Provision::Ready(self.store.absolute_path(&descriptor.stored_file_name));
        }

        if let DictionaryState::Storing { id } = session.state(lang) {
            tracing::debug!(lang, id = %id, "dictionary is being stored");
            return Provision::Pending;
        }

        let superseded = match session.tracked() {
            Some((tracked_lang, id)) if tracked_lang != lang => Some((tracked_lang.to_string(), id)),
            _ => None,
        };
        if let Some((old_lang, id)) = superseded {
            tracing::info!(lang, superseded = %old_lang, id = %id, "abandoning dictionary download");
            session.clear_tracked();
            self.remove_job(&mut session, id);
        }

        self.download_dictionary(&mut session, descriptor);
        Provision::Pending
    }

    /// Starts a download for `descriptor` unless one is already underway.
    /// Runs under the session lock so the job-list check and the decision
    /// are atomic with respect to listener callbacks.
    fn download_dictionary(&self, session: &mut Session, descriptor: &DictionaryDescriptor) {
        let lang = descriptor.language_id.as_str();
        let Some(payload) = descriptor.payload_uri() else {
            return;
        };

        let existing = self
            .downloads
            .list_jobs()
            .into_iter()
            .find(|job| job.uri == payload);

        match existing {
            None => self.start_download(session, lang, payload),
            Some(job) => match job.status {
                DownloadStatus::Successful
                    if session.state(lang) == DictionaryState::Downloading { id: job.id } =>
                {
                    tracing::debug!(lang, id = %job.id, "dictionary download finished; awaiting completion");
                }
                DownloadStatus::Successful => {
                    tracing::warn!(
                        lang,
                        id = %job.id,
                        "dictionary download finished but was never stored; discarding it"
                    );
                    session.clear_tracked();
                    self.remove_job(session, job.id);
                }
                DownloadStatus::Pending | DownloadStatus::InProgress => {
                    tracing::debug!(lang, id = %job.id, "dictionary download already underway");
                    session.set(lang, DictionaryState::Downloading { id: job.id });
                }
                DownloadStatus::Failed => {
                    tracing::info!(lang, id = %job.id, "previous dictionary download failed; restarting");
                    self.remove_job(session, job.id);
                    self.start_download(session, lang, payload);
                }
            },
        }
    }

    fn start_download(&self, session: &mut Session, lang: &str, payload: &str) {
        // Per-language name: payloads of different languages may share a basename.
        let output = self
            .options
            .download_dir
            .join(format!("{}-{}", lang, suggested_filename(payload)));
        match self.downloads.start_download(payload, &output) {
            Ok(record) => {
                tracing::info!(lang, id = %record.id, uri = payload, "dictionary download started");
                session.set(lang, DictionaryState::Downloading { id: record.id });
            }
            Err(e) => {
                tracing::error!(lang, uri = payload, "failed to start dictionary download: {:#}", e);
                session.set(lang, DictionaryState::NotRequested);
            }
        }
    }

    /// Requests removal of a job and its artifact; failures are logged.
    fn remove_job(&self, session: &mut Session, id: DownloadId) {
        session.retire(id);
        if let Err(e) = self.downloads.remove_download(id, true) {
            tracing::warn!(id = %id, "failed to remove download: {:#}", e);
        }
    }

    /// Verifies (when a digest is known) and copies a finished payload into
    /// the store under the dictionary's canonical name.
    fn persist_payload(&self, descriptor: &DictionaryDescriptor, output: &Path) -> Result<u64> {
        if let Some(expected) = descriptor.sha256() {
            let reader = self
                .store
                .open_artifact(output)
                .with_context(|| format!("open {}", output.display()))?;
            let actual = checksum::sha256_reader(reader)?;
            if !checksum::digest_matches(&actual, expected) {
                anyhow::bail!("checksum mismatch: expected {}, got {}", expected, actual);
            }
        }
        let reader = self
            .store
            .open_artifact(output)
            .with_context(|| format!("open {}", output.display()))?;
        copy_into_store(
            reader,
            self.store.as_ref(),
            &descriptor.stored_file_name,
            self.options.copy_buffer_bytes,
        )
    }
}
