use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the pre-fitted model artifacts. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error("Artifact {} was fitted on features {expected:?}, record provides {got:?}", .path.display())]
    FeatureNamesMismatch {
        path: PathBuf,
        expected: Vec<String>,
        got: Vec<String>,
    },
}

/// Errors raised by an artifact's transform/predict call.
#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("{stage} expects {expected} features, got {got}")]
    FeatureCountMismatch {
        stage: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Reducer produced {got} columns, expected {expected}")]
    UnexpectedOutputWidth { expected: usize, got: usize },
}

/// Errors for submitted feature values that a bounded form widget would never produce.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} must be a number, got {value:?}")]
    NotANumber { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_names_the_field() {
        let err = InputError::OutOfRange {
            field: "win_rate",
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(err.to_string(), "win_rate must be between 0 and 1, got 1.5");
    }

    #[test]
    fn test_inference_error_message() {
        let err = InferenceError::FeatureCountMismatch {
            stage: "StandardScaler",
            expected: 7,
            got: 6,
        };
        assert_eq!(err.to_string(), "StandardScaler expects 7 features, got 6");
    }
}
