use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::errors::{InferenceError, InputError};
use crate::model_artifacts::ModelArtifacts;
use crate::prediction::cluster_labels::{ClusterLabel, ClusterLabelTable};
use crate::prediction::features::FeatureRecord;
use crate::prediction::predict::PredictionResult;

/// Everything a request needs, built once at startup and shared read-only by all workers.
pub struct AppContext {
    pub artifacts: ModelArtifacts,
    pub labels: ClusterLabelTable,
}

impl AppContext {
    pub fn new(artifacts: ModelArtifacts, labels: ClusterLabelTable) -> Self {
        AppContext { artifacts, labels }
    }

    pub fn predict(&self, record: &FeatureRecord) -> Result<PredictionResult, ApiError> {
        record.validate()?;
        self.artifacts.predict(record, &self.labels).map_err(|e| {
            error!("Inference failed for {:?}: {}", record, e);
            ApiError::from(e)
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ClustersResponse {
    pub clusters: Vec<ClusterLabel>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Prediction failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("CSV export failed: {0}")]
    Export(#[from] csv::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Input(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) | ApiError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let input = ApiError::from(InputError::NotFinite { field: "avg_pnl" });
        assert_eq!(input.status_code(), StatusCode::BAD_REQUEST);

        let inference = ApiError::from(InferenceError::UnexpectedOutputWidth {
            expected: 2,
            got: 3,
        });
        assert_eq!(inference.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            inference.to_string(),
            "Prediction failed: Reducer produced 3 columns, expected 2"
        );
    }
}
