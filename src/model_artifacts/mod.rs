//! Pre-fitted model artifacts: a feature scaler, a 2-D reducer and a clusterer.
//!
//! Each artifact is the JSON export of a fitted estimator's learned attributes. They are loaded
//! once at startup into [`ModelArtifacts`] and are read-only afterwards, so the context can be
//! shared across HTTP workers without locking.

pub mod kmeans;
pub mod pca;
pub mod standard_scaler;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use crate::errors::{ArtifactError, InferenceError};
use crate::prediction::cluster_labels::ClusterLabelTable;
use crate::prediction::features::{FEATURE_NAMES, FeatureRecord};
use crate::prediction::predict::{PredictionResult, predict};

pub use kmeans::KMeans;
pub use pca::Pca;
pub use standard_scaler::StandardScaler;

/// Row-in, row-out numeric transform (scaler, reducer).
pub trait Transformer: Send + Sync {
    fn n_features_in(&self) -> usize;

    fn n_features_out(&self) -> usize;

    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Assigns a row to one of the fitted clusters.
pub trait Clusterer: Send + Sync {
    fn n_clusters(&self) -> usize;

    fn predict(&self, row: &[f64]) -> Result<usize, InferenceError>;
}

/// Locations of the three artifact files.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub reducer: PathBuf,
    pub clusterer: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: impl AsRef<Path>, scaler: &str, reducer: &str, clusterer: &str) -> Self {
        let dir = dir.as_ref();
        ArtifactPaths {
            scaler: dir.join(scaler),
            reducer: dir.join(reducer),
            clusterer: dir.join(clusterer),
        }
    }
}

pub struct ModelArtifacts {
    pub scaler: Box<dyn Transformer>,
    pub reducer: Box<dyn Transformer>,
    pub clusterer: Box<dyn Clusterer>,
}

impl ModelArtifacts {
    pub fn new(
        scaler: Box<dyn Transformer>,
        reducer: Box<dyn Transformer>,
        clusterer: Box<dyn Clusterer>,
    ) -> Self {
        ModelArtifacts {
            scaler,
            reducer,
            clusterer,
        }
    }

    /// Loads the three artifacts. Any missing or corrupt file is returned as an error and the
    /// caller is expected to abort.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let scaler = StandardScaler::load(&paths.scaler)?;
        if let Some(names) = scaler.feature_names_in() {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
                return Err(ArtifactError::FeatureNamesMismatch {
                    path: paths.scaler.clone(),
                    expected: names.to_vec(),
                    got: FEATURE_NAMES.iter().map(|n| n.to_string()).collect(),
                });
            }
        }
        let reducer = Pca::load(&paths.reducer)?;
        let clusterer = KMeans::load(&paths.clusterer)?;

        info!(
            "Loaded artifacts: scaler {} features, reducer {} -> {}, clusterer {} clusters",
            scaler.n_features_in(),
            reducer.n_features_in(),
            reducer.n_features_out(),
            clusterer.n_clusters()
        );

        Ok(ModelArtifacts::new(
            Box::new(scaler),
            Box::new(reducer),
            Box::new(clusterer),
        ))
    }

    pub fn predict(
        &self,
        record: &FeatureRecord,
        labels: &ClusterLabelTable,
    ) -> Result<PredictionResult, InferenceError> {
        predict(
            record,
            self.scaler.as_ref(),
            self.reducer.as_ref(),
            self.clusterer.as_ref(),
            labels,
        )
    }
}

pub(crate) fn read_json_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let json_str = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json_str).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn check_width(
    stage: &'static str,
    expected: usize,
    row: &[f64],
) -> Result<(), InferenceError> {
    if row.len() != expected {
        return Err(InferenceError::FeatureCountMismatch {
            stage,
            expected,
            got: row.len(),
        });
    }
    Ok(())
}
