//! Directory-backed store.
//!
//! Each stored file is first written to `<name>.part` and atomically renamed
//! on commit, so a reader never sees a half-written dictionary.

use super::{LocalStore, StoreSink};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` (e.g. `nl_wordlist.db` → `nl_wordlist.db.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Store rooted at `store_dir`, reading bundled assets from `assets_dir`.
#[derive(Debug, Clone)]
pub struct FsStore {
    store_dir: PathBuf,
    assets_dir: PathBuf,
}

impl FsStore {
    /// Creates `store_dir` if needed. `assets_dir` is only read.
    pub fn new(store_dir: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Result<Self> {
        let store_dir = store_dir.into();
        fs::create_dir_all(&store_dir)
            .with_context(|| format!("failed to create store dir {}", store_dir.display()))?;
        Ok(FsStore {
            store_dir,
            assets_dir: assets_dir.into(),
        })
    }
}

impl LocalStore for FsStore {
    fn exists(&self, file_name: &str) -> bool {
        self.absolute_path(file_name).is_file()
    }

    fn open_bundled_asset(&self, relative_path: &str) -> io::Result<Box<dyn Read + Send>> {
        let path = self.assets_dir.join(relative_path.trim_start_matches('/'));
        Ok(Box::new(File::open(path)?))
    }

    fn open_artifact(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }

    fn open_for_write(&self, file_name: &str) -> io::Result<Box<dyn StoreSink>> {
        let final_path = self.absolute_path(file_name);
        let part = temp_path(&final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&part)?;
        Ok(Box::new(FsSink {
            writer: Some(BufWriter::new(file)),
            temp_path: part,
            final_path,
        }))
    }

    fn absolute_path(&self, file_name: &str) -> PathBuf {
        self.store_dir.join(file_name)
    }

    fn root(&self) -> PathBuf {
        self.store_dir.clone()
    }
}

struct FsSink {
    writer: Option<BufWriter<File>>,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl FsSink {
    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "sink already committed"))
    }
}

impl Write for FsSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl StoreSink for FsSink {
    fn commit(mut self: Box<Self>) -> io::Result<()> {
        let writer = self.writer.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "sink already committed")
        })?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        // Close before rename.
        drop(file);
        fs::rename(&self.temp_path, &self.final_path).map_err(|e| {
            let _ = fs::remove_file(&self.temp_path);
            e
        })
    }
}

impl Drop for FsSink {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            match fs::remove_file(&self.temp_path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(
                    path = %self.temp_path.display(),
                    "could not remove uncommitted file: {}",
                    e
                ),
            }
        }
    }
}
