//! JSON manifest of downloadable dictionaries.
//!
//! Published alongside the application so new languages can be offered
//! without a release:
//!
//! ```json
//! { "dictionaries": [
//!     { "lang": "nl", "payload": "https://example/nl.dic", "sha256": "…" } ] }
//! ```

use super::error::CatalogError;
use super::types::DictionaryDescriptor;
use crate::url_model::sanitize_filename_for_linux;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    dictionaries: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    lang: String,
    payload: String,
    #[serde(default)]
    sha256: Option<String>,
    /// Overrides the canonical `<lang>_wordlist.db` store name.
    #[serde(default)]
    file: Option<String>,
}

/// Parses manifest text into external descriptors, validating each entry.
pub(super) fn parse_manifest(json: &str) -> Result<Vec<DictionaryDescriptor>, CatalogError> {
    let manifest: Manifest = serde_json::from_str(json)?;
    manifest
        .dictionaries
        .into_iter()
        .map(|entry| {
            let lang = entry.lang.trim();
            if lang.is_empty() {
                return Err(CatalogError::EmptyField {
                    language: entry.lang.clone(),
                    field: "lang",
                });
            }
            let payload = entry.payload.trim();
            if payload.is_empty() {
                return Err(CatalogError::EmptyField {
                    language: lang.to_string(),
                    field: "payload",
                });
            }
            let mut descriptor = DictionaryDescriptor::external(lang, payload);
            if let Some(digest) = entry.sha256.as_deref().filter(|d| !d.trim().is_empty()) {
                descriptor = descriptor.with_sha256(digest.trim());
            }
            if let Some(file) = entry.file.as_deref() {
                let file = sanitize_filename_for_linux(file.trim());
                if file.is_empty() {
                    return Err(CatalogError::EmptyField {
                        language: lang.to_string(),
                        field: "file",
                    });
                }
                descriptor = descriptor.with_stored_file_name(&file);
            }
            Ok(descriptor)
        })
        .collect()
}
