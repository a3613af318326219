//! `dicprov fetch <lang>` – provision a dictionary, waiting for its download
//! to be stored. Transfers run inside this process, so the command stays up
//! until the dictionary is stored, the download fails, or the timeout hits.

use crate::cli::context::AppContext;
use anyhow::{Context, Result};
use dicprov_core::downloads::{DownloadManager, DownloadRecord, DownloadStatus, DownloadsListener};
use dicprov_core::provisioner::{DictionaryState, Provision};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Wakes the waiting command whenever the download subsystem reports anything.
struct EventForwarder(mpsc::UnboundedSender<()>);

impl DownloadsListener for EventForwarder {
    fn on_downloads_update(&self, _jobs: &[DownloadRecord]) {
        let _ = self.0.send(());
    }

    fn on_download_completed(&self, _job: &DownloadRecord) {
        let _ = self.0.send(());
    }
}

pub async fn run_fetch(ctx: &AppContext, lang: &str, timeout_secs: u64) -> Result<()> {
    ctx.provisioner.init();
    // Registered after the provisioner so it observes already-handled events.
    let (tx, rx) = mpsc::unbounded_channel();
    let forwarder: Arc<dyn DownloadsListener> = Arc::new(EventForwarder(tx));
    ctx.downloads.add_listener(Arc::clone(&forwarder));

    let result = fetch(ctx, lang, timeout_secs, rx).await;

    ctx.downloads.remove_listener(&forwarder);
    ctx.provisioner.end();

    let path = result?;
    println!("{}", path.display());
    Ok(())
}

async fn fetch(
    ctx: &AppContext,
    lang: &str,
    timeout_secs: u64,
    mut events: mpsc::UnboundedReceiver<()>,
) -> Result<PathBuf> {
    let provisioner = Arc::clone(&ctx.provisioner);
    let lang_owned = lang.to_string();
    // Materialization and the store copy are blocking I/O.
    let provision = tokio::task::spawn_blocking(move || provisioner.provision(&lang_owned))
        .await
        .context("provisioning task panicked")?;

    match provision {
        Provision::Ready(path) => return Ok(path),
        Provision::Degraded { path, missing } => {
            eprintln!(
                "warning: {} bundled file(s) could not be installed: {}",
                missing.len(),
                missing.join(", ")
            );
            return Ok(path);
        }
        Provision::Unknown => anyhow::bail!("no dictionary for language {lang}"),
        Provision::Pending => eprintln!("downloading dictionary for {lang}..."),
    }

    tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        wait_until_stored(ctx, lang, &mut events),
    )
    .await
    .with_context(|| format!("timed out after {timeout_secs}s waiting for {lang}"))?
}

async fn wait_until_stored(
    ctx: &AppContext,
    lang: &str,
    events: &mut mpsc::UnboundedReceiver<()>,
) -> Result<PathBuf> {
    loop {
        if let Some(path) = check_progress(ctx, lang)? {
            return Ok(path);
        }
        if events.recv().await.is_none() {
            anyhow::bail!("download subsystem stopped");
        }
    }
}

/// `Some(path)` once stored; an error once the download can no longer succeed.
fn check_progress(ctx: &AppContext, lang: &str) -> Result<Option<PathBuf>> {
    match ctx.provisioner.state(lang) {
        DictionaryState::Stored => ctx
            .provisioner
            .get_or_download(lang)
            .map(Some)
            .with_context(|| format!("dictionary for {lang} vanished after being stored")),
        DictionaryState::Downloading { id } => {
            let failed = ctx
                .downloads
                .list_jobs()
                .iter()
                .any(|j| j.id == id && j.status == DownloadStatus::Failed);
            if failed {
                anyhow::bail!("download of {lang} failed; see the log for details");
            }
            Ok(None)
        }
        DictionaryState::Storing { .. } => Ok(None),
        DictionaryState::NotRequested => {
            anyhow::bail!("download of {lang} was abandoned or could not be stored")
        }
    }
}
