use std::path::Path;

use serde::Deserialize;

use crate::errors::{ArtifactError, InferenceError};
use crate::model_artifacts::{Transformer, check_width, read_json_artifact};

/// Fitted principal component projection.
#[derive(Debug, Clone, Deserialize)]
pub struct Pca {
    mean: Vec<f64>,
    /// One row per component, each of length `mean.len()`
    components: Vec<Vec<f64>>,
    #[serde(default)]
    explained_variance: Option<Vec<f64>>,
    #[serde(default)]
    whiten: bool,
}

impl Pca {
    pub fn new(mean: Vec<f64>, components: Vec<Vec<f64>>) -> Self {
        Pca {
            mean,
            components,
            explained_variance: None,
            whiten: false,
        }
    }

    pub fn load(pca_file_path: &Path) -> Result<Self, ArtifactError> {
        let pca: Pca = read_json_artifact(pca_file_path)?;
        pca.validate().map_err(|reason| ArtifactError::Invalid {
            path: pca_file_path.to_path_buf(),
            reason,
        })?;
        Ok(pca)
    }

    fn validate(&self) -> Result<(), String> {
        if self.components.is_empty() {
            return Err("no components".to_string());
        }
        if let Some(row) = self.components.iter().find(|c| c.len() != self.mean.len()) {
            return Err(format!(
                "component of length {} does not match {} features",
                row.len(),
                self.mean.len()
            ));
        }
        if self.whiten {
            match &self.explained_variance {
                Some(var) if var.len() == self.components.len() => {
                    if var.iter().any(|v| *v <= 0.0) {
                        return Err("explained_variance must be positive to whiten".to_string());
                    }
                }
                _ => {
                    return Err(
                        "whiten requires one explained_variance entry per component".to_string()
                    );
                }
            }
        }
        Ok(())
    }
}

impl Transformer for Pca {
    fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    fn n_features_out(&self) -> usize {
        self.components.len()
    }

    /// Equivalent to sklearn's PCA.transform(X): (x - mean) · componentsᵀ, divided by
    /// sqrt(explained_variance) when whitened
    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width("PCA", self.mean.len(), x)?;
        let centered: Vec<f64> = x.iter().zip(&self.mean).map(|(xi, m)| xi - m).collect();
        let projected = self
            .components
            .iter()
            .enumerate()
            .map(|(i, component)| {
                let dot: f64 = component.iter().zip(&centered).map(|(c, v)| c * v).sum();
                match (&self.explained_variance, self.whiten) {
                    (Some(var), true) => dot / var[i].sqrt(),
                    _ => dot,
                }
            })
            .collect();
        Ok(projected)
    }
}
