//! Single-stream GET of a payload into its output file.
//!
//! Bytes go to `<output>.part`, renamed to `<output>` only after a complete,
//! successful transfer. The `.part` file is removed on any failure.

use crate::config::TransferConfig;
use crate::store::temp_path;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub enum TransferError {
    /// The job was removed while the transfer was running.
    Aborted,
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Writing the output file failed (e.g. disk full, permission denied).
    Storage(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Aborted => write!(f, "transfer aborted"),
            TransferError::Curl(e) => write!(f, "{}", e),
            TransferError::Http(code) => write!(f, "HTTP {}", code),
            TransferError::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransferError::Curl(e) => Some(e),
            TransferError::Storage(e) => Some(e),
            TransferError::Aborted | TransferError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for TransferError {
    fn from(e: curl::Error) -> Self {
        TransferError::Curl(e)
    }
}

/// Removes the `.part` file when dropped unless disarmed.
struct PartGuard {
    path: PathBuf,
    armed: bool,
}

impl Drop for PartGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Downloads `uri` into `output`. Returns the number of bytes written.
pub(super) fn download_to(
    uri: &str,
    output: &Path,
    abort: &AtomicBool,
    cfg: &TransferConfig,
) -> Result<u64, TransferError> {
    let part = temp_path(output);
    let mut guard = PartGuard {
        path: part.clone(),
        armed: true,
    };
    let file = File::create(&part).map_err(TransferError::Storage)?;
    let mut writer = BufWriter::new(file);
    let mut write_error: Option<io::Error> = None;
    let mut written = 0u64;

    let mut easy = curl::easy::Easy::new();
    easy.url(uri)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(cfg.connect_timeout())?;
    easy.low_speed_limit(cfg.low_speed_limit_bytes)?;
    easy.low_speed_time(cfg.low_speed_time())?;
    easy.progress(true)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match writer.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.progress_function(|_, _, _, _| !abort.load(Ordering::Relaxed))?;
        transfer.perform()
    };

    if abort.load(Ordering::Relaxed) {
        return Err(TransferError::Aborted);
    }
    if let Some(e) = write_error {
        return Err(TransferError::Storage(e));
    }
    performed?;

    // file:// and other non-HTTP schemes report 0.
    let code = easy.response_code()?;
    if code != 0 && !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }

    let file = writer
        .into_inner()
        .map_err(|e| TransferError::Storage(e.into_error()))?;
    file.sync_all().map_err(TransferError::Storage)?;
    drop(file);
    fs::rename(&part, output).map_err(TransferError::Storage)?;
    guard.armed = false;
    Ok(written)
}
