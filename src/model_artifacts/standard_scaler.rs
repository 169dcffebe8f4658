use std::path::Path;

use serde::Deserialize;

use crate::errors::{ArtifactError, InferenceError};
use crate::model_artifacts::{Transformer, check_width, read_json_artifact};

#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    feature_names_in: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        StandardScaler {
            mean,
            scale,
            feature_names_in: None,
        }
    }

    pub fn load(scaler_file_path: &Path) -> Result<Self, ArtifactError> {
        let scaler: StandardScaler = read_json_artifact(scaler_file_path)?;
        scaler.validate().map_err(|reason| ArtifactError::Invalid {
            path: scaler_file_path.to_path_buf(),
            reason,
        })?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<(), String> {
        if self.mean.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(names) = &self.feature_names_in {
            if names.len() != self.mean.len() {
                return Err(format!(
                    "feature_names_in has {} entries for {} features",
                    names.len(),
                    self.mean.len()
                ));
            }
        }
        // sklearn stores 1.0 for zero-variance columns, so a zero here means a broken export
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err("scale must be finite and non-zero".to_string());
        }
        Ok(())
    }

    pub fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }
}

impl Transformer for StandardScaler {
    fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    fn n_features_out(&self) -> usize {
        self.mean.len()
    }

    /// Equivalent to sklearn's StandardScaler.transform(X) for a single row
    fn transform(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width("StandardScaler", self.mean.len(), x)?;
        Ok(x.iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((&xi, &m), &s)| (xi - m) / s)
            .collect())
    }
}
