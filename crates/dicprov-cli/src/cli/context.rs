//! Wiring of catalog, store, download subsystem and provisioner from config.

use anyhow::{Context, Result};
use dicprov_core::catalog::Catalog;
use dicprov_core::config::DicprovConfig;
use dicprov_core::downloads::CurlDownloadManager;
use dicprov_core::provisioner::{Provisioner, ProvisionerOptions};
use dicprov_core::store::{FsStore, LocalStore};
use std::sync::Arc;

pub struct AppContext {
    pub store: Arc<FsStore>,
    pub downloads: CurlDownloadManager,
    pub provisioner: Arc<Provisioner>,
}

impl AppContext {
    pub fn from_config(cfg: &DicprovConfig) -> Result<Self> {
        let catalog = match &cfg.catalog_manifest {
            Some(path) => Catalog::load_manifest(path)
                .with_context(|| format!("failed to load catalog {}", path.display()))?,
            None => Catalog::builtin(),
        };
        let store = Arc::new(FsStore::new(cfg.resolve_store_dir()?, cfg.assets_dir.clone())?);
        let downloads = CurlDownloadManager::new(cfg.transfer_or_default())?;
        let provisioner = Provisioner::new(
            Arc::new(catalog),
            Arc::new(downloads.clone()),
            Arc::clone(&store) as Arc<dyn LocalStore>,
            ProvisionerOptions::from_config(cfg)?,
        );
        Ok(AppContext {
            store,
            downloads,
            provisioner,
        })
    }
}
