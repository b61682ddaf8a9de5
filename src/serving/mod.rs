pub mod handlers;
pub mod model_dir;

use std::path::PathBuf;

use thiserror::Error;

use crate::shared::error::VisionError;

/// Errors at the serving host boundary: model directory layout, request
/// decoding, and response encoding.
#[derive(Error, Debug)]
pub enum ServeError {
    #[error("model directory {} has no *.{ext} file", .dir.display())]
    MissingArtifact { dir: PathBuf, ext: &'static str },

    #[error("model directory {} has {count} *.{ext} files, expected exactly one", .dir.display())]
    AmbiguousArtifact {
        dir: PathBuf,
        ext: &'static str,
        count: usize,
    },

    #[error("failed to read model directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported content type: {0}")]
    ContentType(String),

    #[error("failed to decode request body: {0}")]
    BadBody(#[from] serde_json::Error),

    #[error(transparent)]
    Vision(#[from] VisionError),
}
