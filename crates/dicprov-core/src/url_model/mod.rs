//! Suggested local file names for download jobs.
//!
//! A download job writes its payload under the download directory using a
//! name derived from the payload URI, sanitized for Linux filesystems.

mod path;
mod sanitize;

pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename_for_linux;

/// Fallback when the URI yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// Derives the file name a download job for `uri` should write to.
///
/// - `derive_filename("https://example.com/dicts/nl.dic")` → `"nl.dic"`
/// - `derive_filename("https://example.com/")` → `"download.bin"`
pub fn derive_filename(uri: &str) -> String {
    let sanitized = filename_from_url_path(uri)
        .map(|raw| sanitize_filename_for_linux(&raw))
        .unwrap_or_default();
    if sanitized.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}
