use serde::Serialize;
use tracing::debug;

use crate::errors::InferenceError;
use crate::model_artifacts::{Clusterer, Transformer};
use crate::prediction::cluster_labels::ClusterLabelTable;
use crate::prediction::features::FeatureRecord;

pub const PCA_COLUMNS: [&str; 2] = ["PCA 1", "PCA 2"];

/// The reduced 2-D projection of one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PcaCoordinates {
    #[serde(rename = "PCA 1")]
    pub pca_1: f64,
    #[serde(rename = "PCA 2")]
    pub pca_2: f64,
}

impl PcaCoordinates {
    pub fn from_row(row: &[f64]) -> Result<Self, InferenceError> {
        match row {
            [pca_1, pca_2] => Ok(PcaCoordinates {
                pca_1: *pca_1,
                pca_2: *pca_2,
            }),
            _ => Err(InferenceError::UnexpectedOutputWidth {
                expected: PCA_COLUMNS.len(),
                got: row.len(),
            }),
        }
    }

    /// Cell text shared by the HTML table and the CSV export.
    pub fn cells(&self) -> [String; 2] {
        [format_coordinate(self.pca_1), format_coordinate(self.pca_2)]
    }

    /// `PCA 1,PCA 2` header plus one data row.
    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(PCA_COLUMNS)?;
        wtr.write_record(self.cells())?;
        wtr.into_inner().map_err(|e| e.into_error().into())
    }
}

/// Shortest representation that parses back to the same value, always with a decimal point or
/// exponent.
fn format_coordinate(value: f64) -> String {
    format!("{value:?}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub cluster_id: usize,
    pub cluster_label: &'static str,
    pub coordinates: PcaCoordinates,
}

/// Runs one record through the fitted pipeline.
///
/// The cluster is assigned from the scaled row; the reduced row is only used for display.
pub fn predict(
    record: &FeatureRecord,
    scaler: &dyn Transformer,
    reducer: &dyn Transformer,
    clusterer: &dyn Clusterer,
    labels: &ClusterLabelTable,
) -> Result<PredictionResult, InferenceError> {
    let scaled = scaler.transform(&record.to_vec())?;
    let reduced = reducer.transform(&scaled)?;
    let coordinates = PcaCoordinates::from_row(&reduced)?;
    let cluster_id = clusterer.predict(&scaled)?;
    let cluster_label = labels.label_for(cluster_id);

    debug!(
        "Predicted cluster {} ({}) at ({}, {})",
        cluster_id, cluster_label, coordinates.pca_1, coordinates.pca_2
    );

    Ok(PredictionResult {
        cluster_id,
        cluster_label,
        coordinates,
    })
}
