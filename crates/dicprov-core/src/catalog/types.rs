//! Catalog entry types.

/// How a dictionary reaches the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryKind {
    /// Shipped inside the bundled assets; only needs materialization.
    Builtin,
    /// Fetched over the network through the download subsystem.
    External,
}

/// Where the bytes of a dictionary come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    /// Bundled asset names, in materialization order.
    Builtin { asset_names: Vec<String> },
    /// Remote payload plus an optional lowercase-hex SHA-256 of it.
    External {
        payload_uri: String,
        sha256: Option<String>,
    },
}

/// Immutable catalog entry for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryDescriptor {
    pub language_id: String,
    pub source: DictionarySource,
    /// Name of the file in the local store. For builtin dictionaries this is
    /// the first bundled asset.
    pub stored_file_name: String,
}

impl DictionaryDescriptor {
    pub fn builtin(language_id: &str, asset_names: &[&str]) -> Self {
        let asset_names: Vec<String> = asset_names.iter().map(|s| s.to_string()).collect();
        Self {
            language_id: language_id.to_string(),
            stored_file_name: asset_names.first().cloned().unwrap_or_default(),
            source: DictionarySource::Builtin { asset_names },
        }
    }

    /// External entry stored under the canonical `<lang>_wordlist.db` name.
    pub fn external(language_id: &str, payload_uri: &str) -> Self {
        Self {
            language_id: language_id.to_string(),
            stored_file_name: external_file_name(language_id),
            source: DictionarySource::External {
                payload_uri: payload_uri.to_string(),
                sha256: None,
            },
        }
    }

    pub fn with_sha256(mut self, digest: &str) -> Self {
        if let DictionarySource::External { sha256, .. } = &mut self.source {
            *sha256 = Some(digest.to_ascii_lowercase());
        }
        self
    }

    pub fn with_stored_file_name(mut self, name: &str) -> Self {
        self.stored_file_name = name.to_string();
        self
    }

    pub fn kind(&self) -> DictionaryKind {
        match self.source {
            DictionarySource::Builtin { .. } => DictionaryKind::Builtin,
            DictionarySource::External { .. } => DictionaryKind::External,
        }
    }

    /// Bundled asset names; empty for external dictionaries.
    pub fn asset_names(&self) -> &[String] {
        match &self.source {
            DictionarySource::Builtin { asset_names } => asset_names,
            DictionarySource::External { .. } => &[],
        }
    }

    pub fn payload_uri(&self) -> Option<&str> {
        match &self.source {
            DictionarySource::External { payload_uri, .. } => Some(payload_uri),
            DictionarySource::Builtin { .. } => None,
        }
    }

    pub fn sha256(&self) -> Option<&str> {
        match &self.source {
            DictionarySource::External { sha256, .. } => sha256.as_deref(),
            DictionarySource::Builtin { .. } => None,
        }
    }
}

/// Suffix appended to the language id to name a downloaded dictionary.
pub const EXTERNAL_FILE_SUFFIX: &str = "_wordlist.db";

/// Canonical store name of an external dictionary, e.g. `nl` → `nl_wordlist.db`.
pub fn external_file_name(language_id: &str) -> String {
    format!("{}{}", language_id, EXTERNAL_FILE_SUFFIX)
}
