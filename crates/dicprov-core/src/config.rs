use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Curl tuning for the in-process download subsystem (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Seconds to wait for the TCP/TLS connection to be established.
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes per second...
    pub low_speed_limit_bytes: u32,
    /// ...for at least this many seconds.
    pub low_speed_time_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
        }
    }
}

impl TransferConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn low_speed_time(&self) -> Duration {
        Duration::from_secs(self.low_speed_time_secs)
    }
}

/// Global configuration loaded from `~/.config/dicprov/config.toml`.
/// Missing keys take their [`Default`] values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DicprovConfig {
    /// Where materialized and downloaded dictionaries live. Defaults to `$XDG_DATA_HOME/dicprov/dictionaries`.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
    /// Where download jobs write their temporary payloads. Defaults to `$XDG_CACHE_HOME/dicprov/downloads`.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Root of the bundled assets shipped with the application.
    pub assets_dir: PathBuf,
    /// Prefix (relative to `assets_dir`) under which builtin dictionaries are bundled.
    pub builtin_asset_prefix: String,
    /// Optional JSON manifest listing downloadable dictionaries.
    #[serde(default)]
    pub catalog_manifest: Option<PathBuf>,
    /// Buffer size used when copying dictionaries into the store.
    pub copy_buffer_bytes: usize,
    /// Optional transfer tuning; if missing, built-in defaults are used.
    #[serde(default)]
    pub transfer: Option<TransferConfig>,
}

impl Default for DicprovConfig {
    fn default() -> Self {
        Self {
            store_dir: None,
            download_dir: None,
            assets_dir: PathBuf::from("/usr/share/dicprov/assets"),
            builtin_asset_prefix: "dictionaries/".to_string(),
            catalog_manifest: None,
            copy_buffer_bytes: 8 * 1024,
            transfer: None,
        }
    }
}

impl DicprovConfig {
    /// Store directory, falling back to the XDG data home.
    pub fn resolve_store_dir(&self) -> Result<PathBuf> {
        match &self.store_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("dicprov")?;
                Ok(xdg_dirs.get_data_home().join("dictionaries"))
            }
        }
    }

    /// Download directory, falling back to the XDG cache home.
    pub fn resolve_download_dir(&self) -> Result<PathBuf> {
        match &self.download_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("dicprov")?;
                Ok(xdg_dirs.get_cache_home().join("downloads"))
            }
        }
    }

    pub fn transfer_or_default(&self) -> TransferConfig {
        self.transfer.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dicprov")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DicprovConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DicprovConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: DicprovConfig = toml::from_str(&data)?;
    Ok(cfg)
}
