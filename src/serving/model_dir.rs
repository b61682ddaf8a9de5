use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::inference_engine::LoadEngine;
use crate::serving::ServeError;
use crate::shared::labels::LabelTable;

/// Persisted network artifacts, by convention exactly one `*.labels`,
/// one `*.cfg`, and one `*.weights` file per model directory.
#[derive(Clone, Debug)]
pub struct ModelArtifacts {
    pub labels: PathBuf,
    pub config: PathBuf,
    pub weights: PathBuf,
}

impl ModelArtifacts {
    /// Scans `dir` for the three artifact files. Absence or multiplicity
    /// of any of them is fatal.
    pub fn discover(dir: &Path) -> Result<Self, ServeError> {
        Ok(Self {
            labels: single_with_extension(dir, "labels")?,
            config: single_with_extension(dir, "cfg")?,
            weights: single_with_extension(dir, "weights")?,
        })
    }
}

fn single_with_extension(dir: &Path, ext: &'static str) -> Result<PathBuf, ServeError> {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|e| e == ext))
        .collect();

    match matches.len() {
        0 => Err(ServeError::MissingArtifact {
            dir: dir.to_path_buf(),
            ext,
        }),
        1 => Ok(matches.remove(0)),
        count => Err(ServeError::AmbiguousArtifact {
            dir: dir.to_path_buf(),
            ext,
            count,
        }),
    }
}

/// Loads a model directory into an engine handle plus its label table —
/// the `model_fn` shape of the serving host. Serving engines are loaded
/// with a batch size of one.
pub fn load_model<L: LoadEngine>(
    loader: &L,
    dir: &Path,
) -> Result<(L::Engine, LabelTable), ServeError> {
    let artifacts = ModelArtifacts::discover(dir)?;
    log::info!(
        "loading model: config={}, weights={}",
        artifacts.config.display(),
        artifacts.weights.display()
    );
    let labels = LabelTable::from_path(&artifacts.labels)?;
    let engine = loader.load(&artifacts.config, &artifacts.weights, 1)?;
    Ok((engine, labels))
}
