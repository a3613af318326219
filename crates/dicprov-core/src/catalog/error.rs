//! Catalog construction errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dictionary manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("language {0:?} is listed more than once")]
    DuplicateLanguage(String),
    #[error("languages {first:?} and {second:?} share the payload {uri}")]
    DuplicatePayload {
        uri: String,
        first: String,
        second: String,
    },
    #[error("{field} {value:?} of a dictionary entry is not a plain file name")]
    UnsafeName { field: &'static str, value: String },
    #[error("dictionary entry for {language:?} has an empty {field}")]
    EmptyField {
        language: String,
        field: &'static str,
    },
}
