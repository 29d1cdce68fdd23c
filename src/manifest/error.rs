//! Manifest access errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest.json not found at {0}")]
    NotFound(PathBuf),

    #[error("manifest is not a JSON object")]
    NotAnObject,

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid registry: {0}")]
    InvalidRegistry(String),
}
