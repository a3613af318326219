//! Dictionary catalog: static mapping from language id to how its dictionary
//! is obtained.
//!
//! Built once at startup (bundled entries plus an optional manifest of
//! downloadable ones) and shared read-only as `Arc<Catalog>`.

mod error;
mod manifest;
mod types;

pub use error::CatalogError;
pub use types::{
    external_file_name, DictionaryDescriptor, DictionaryKind, DictionarySource,
    EXTERNAL_FILE_SUFFIX,
};

use crate::url_model::sanitize_filename_for_linux;
use std::collections::BTreeMap;
use std::path::Path;

/// Dictionaries bundled with the application assets.
const BUILTIN_DICTIONARIES: &[(&str, &[&str])] = &[
    ("ja_JP", &["japanese_dict.db"]),
    ("zh_CN", &["google_pinyin.db"]),
    ("zh_TW", &["zhuyin_words.db", "zhuyin_phrases.db"]),
];

fn check_plain_name(field: &'static str, value: &str) -> Result<(), CatalogError> {
    if value.is_empty() || sanitize_filename_for_linux(value) != value {
        return Err(CatalogError::UnsafeName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Read-only lookup table of dictionaries by language id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, DictionaryDescriptor>,
}

impl Catalog {
    /// Builds a catalog from explicit entries. Language ids must be unique.
    pub fn new(
        entries: impl IntoIterator<Item = DictionaryDescriptor>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();
        catalog.extend(entries)?;
        Ok(catalog)
    }

    /// Only the dictionaries bundled with the application.
    pub fn builtin() -> Self {
        let entries = BUILTIN_DICTIONARIES
            .iter()
            .map(|(lang, assets)| {
                (
                    lang.to_string(),
                    DictionaryDescriptor::builtin(lang, assets),
                )
            })
            .collect();
        Catalog { entries }
    }

    /// Bundled dictionaries plus the external entries of a JSON manifest.
    pub fn from_manifest_json(json: &str) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::builtin();
        catalog.extend(manifest::parse_manifest(json)?)?;
        Ok(catalog)
    }

    /// Like [`Catalog::from_manifest_json`], reading the manifest from disk.
    pub fn load_manifest(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_manifest_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            entries = catalog.len(),
            "loaded dictionary catalog"
        );
        Ok(catalog)
    }

    fn extend(
        &mut self,
        entries: impl IntoIterator<Item = DictionaryDescriptor>,
    ) -> Result<(), CatalogError> {
        for entry in entries {
            if self.entries.contains_key(&entry.language_id) {
                return Err(CatalogError::DuplicateLanguage(entry.language_id));
            }
            // Language ids and stored names end up as store file names.
            check_plain_name("language", &entry.language_id)?;
            check_plain_name("stored file", &entry.stored_file_name)?;
            if let Some(uri) = entry.payload_uri() {
                if let Some(other) = self.resolve_by_payload(uri) {
                    return Err(CatalogError::DuplicatePayload {
                        uri: uri.to_string(),
                        first: other.language_id.clone(),
                        second: entry.language_id,
                    });
                }
            }
            self.entries.insert(entry.language_id.clone(), entry);
        }
        Ok(())
    }

    pub fn resolve(&self, language_id: &str) -> Option<&DictionaryDescriptor> {
        self.entries.get(language_id)
    }

    pub fn is_builtin(&self, language_id: &str) -> bool {
        self.resolve(language_id)
            .is_some_and(|d| d.kind() == DictionaryKind::Builtin)
    }

    pub fn is_external(&self, language_id: &str) -> bool {
        self.resolve(language_id)
            .is_some_and(|d| d.kind() == DictionaryKind::External)
    }

    /// The external dictionary whose payload is `uri`, if any.
    pub fn resolve_by_payload(&self, uri: &str) -> Option<&DictionaryDescriptor> {
        self.entries
            .values()
            .find(|d| d.payload_uri() == Some(uri))
    }

    /// All entries ordered by language id.
    pub fn iter(&self) -> impl Iterator<Item = &DictionaryDescriptor> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
