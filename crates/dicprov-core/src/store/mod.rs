//! Local store: persistent, name-addressed dictionary files plus read access
//! to the bundled assets and to download job artifacts.
//!
//! The provisioner only talks to the [`LocalStore`] trait; [`FsStore`] is
//! the on-disk implementation.

mod fs;

pub use fs::{temp_path, FsStore, TEMP_SUFFIX};

use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Default copy buffer (8 KiB).
pub const DEFAULT_COPY_BUFFER: usize = 8 * 1024;

/// Destination for one stored file. Bytes only become visible under the
/// target name after [`StoreSink::commit`]; dropping an uncommitted sink
/// discards what was written.
pub trait StoreSink: Write + Send {
    fn commit(self: Box<Self>) -> io::Result<()>;
}

pub trait LocalStore: Send + Sync {
    /// Whether a committed file named `file_name` is present.
    fn exists(&self, file_name: &str) -> bool;

    /// Opens a bundled asset, `relative_path` being relative to the asset root.
    fn open_bundled_asset(&self, relative_path: &str) -> io::Result<Box<dyn Read + Send>>;

    /// Opens a download job's output file.
    fn open_artifact(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    fn open_for_write(&self, file_name: &str) -> io::Result<Box<dyn StoreSink>>;

    fn absolute_path(&self, file_name: &str) -> PathBuf;

    /// Directory holding every stored dictionary.
    fn root(&self) -> PathBuf;
}

/// Copies `reader` into the store under `file_name`, committing only after
/// every byte was written. Returns the number of bytes stored.
///
/// Blocking I/O; run it on a thread that is allowed to block.
pub fn copy_into_store(
    mut reader: impl Read,
    store: &dyn LocalStore,
    file_name: &str,
    buffer_bytes: usize,
) -> Result<u64> {
    let mut sink = store
        .open_for_write(file_name)
        .with_context(|| format!("open {} for write", file_name))?;
    let mut buf = vec![0u8; buffer_bytes.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).with_context(|| format!("read source for {}", file_name)),
        };
        sink.write_all(&buf[..n])
            .with_context(|| format!("write {}", file_name))?;
        total += n as u64;
    }
    sink.flush().with_context(|| format!("flush {}", file_name))?;
    sink.commit()
        .with_context(|| format!("commit {}", file_name))?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
            }
            self.served = true;
            buf[..3].copy_from_slice(b"abc");
            Ok(3)
        }
    }

    #[test]
    fn copy_commits_all_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("store"), dir.path().join("assets")).unwrap();
        let body: Vec<u8> = (0u8..=255).cycle().take(20_000).collect();

        let n = copy_into_store(&body[..], &store, "nl_wordlist.db", 1024).unwrap();
        assert_eq!(n, body.len() as u64);
        assert!(store.exists("nl_wordlist.db"));
        assert_eq!(std::fs::read(store.absolute_path("nl_wordlist.db")).unwrap(), body);
    }

    #[test]
    fn failed_copy_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("store"), dir.path().join("assets")).unwrap();

        let err = copy_into_store(FailingReader { served: false }, &store, "x.db", 2).unwrap_err();
        assert!(format!("{:#}", err).contains("device gone"));
        assert!(!store.exists("x.db"));
        assert!(!temp_path(&store.absolute_path("x.db")).exists());
    }
}
