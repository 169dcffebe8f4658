use std::path::Path;

use serde::Deserialize;

use crate::errors::{ArtifactError, InferenceError};
use crate::model_artifacts::{Clusterer, check_width, read_json_artifact};

/// Fitted k-means model. Only the centroids are needed for assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct KMeans {
    cluster_centers: Vec<Vec<f64>>,
}

impl KMeans {
    pub fn new(cluster_centers: Vec<Vec<f64>>) -> Self {
        KMeans { cluster_centers }
    }

    pub fn load(kmeans_file_path: &Path) -> Result<Self, ArtifactError> {
        let kmeans: KMeans = read_json_artifact(kmeans_file_path)?;
        kmeans.validate().map_err(|reason| ArtifactError::Invalid {
            path: kmeans_file_path.to_path_buf(),
            reason,
        })?;
        Ok(kmeans)
    }

    fn validate(&self) -> Result<(), String> {
        let Some(first) = self.cluster_centers.first() else {
            return Err("no cluster centers".to_string());
        };
        if first.is_empty() {
            return Err("cluster centers have no features".to_string());
        }
        if self.cluster_centers.iter().any(|c| c.len() != first.len()) {
            return Err("cluster centers have different lengths".to_string());
        }
        Ok(())
    }

    fn n_features_in(&self) -> usize {
        self.cluster_centers.first().map_or(0, Vec::len)
    }
}

impl Clusterer for KMeans {
    fn n_clusters(&self) -> usize {
        self.cluster_centers.len()
    }

    /// Index of the nearest centroid by squared euclidean distance. Ties go to the lowest index,
    /// as in sklearn.
    fn predict(&self, x: &[f64]) -> Result<usize, InferenceError> {
        check_width("KMeans", self.n_features_in(), x)?;
        let mut best = (0, f64::INFINITY);
        for (i, center) in self.cluster_centers.iter().enumerate() {
            let distance: f64 = center.iter().zip(x).map(|(c, v)| (c - v).powi(2)).sum();
            if distance < best.1 {
                best = (i, distance);
            }
        }
        Ok(best.0)
    }
}
