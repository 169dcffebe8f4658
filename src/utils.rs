use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tracing::warn;

use crate::errors::ConfigError;
use crate::model_artifacts::ArtifactPaths;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    pub artifacts_dir: PathBuf,
    pub scaler_file: String,
    pub reducer_file: String,
    pub clusterer_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_address: "127.0.0.1".to_string(),
            port: 8501,
            artifacts_dir: PathBuf::from("models"),
            scaler_file: "scaler.json".to_string(),
            reducer_file: "pca.json".to_string(),
            clusterer_file: "kmeans_model.json".to_string(),
        }
    }
}

impl Config {
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(
            &self.artifacts_dir,
            &self.scaler_file,
            &self.reducer_file,
            &self.clusterer_file,
        )
    }

    fn apply_overrides(mut self, cli: &Cli) -> Self {
        if let Some(bind_address) = &cli.bind_address {
            self.bind_address = bind_address.clone();
        }
        if let Some(port) = cli.port {
            self.port = port;
        }
        if let Some(artifacts_dir) = &cli.artifacts_dir {
            self.artifacts_dir = artifacts_dir.clone();
        }
        self
    }
}

/// Command line flags. Anything given here wins over config.yaml.
#[derive(Debug, Parser)]
#[command(version, about = "Trader profiling dashboard")]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = "config.yaml")]
    pub config: PathBuf,

    #[arg(long)]
    pub bind_address: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding scaler, reducer and clusterer artifacts
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,
}

/// Loads the configuration file. A missing file falls back to defaults; a file that exists but
/// cannot be read or parsed is an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(config_content) => {
            serde_yaml::from_str::<Config>(&config_content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("{} not found, using defaults", path.display());
            Ok(Config::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn resolve_config(cli: &Cli) -> Result<Config, ConfigError> {
    Ok(load_config(&cli.config)?.apply_overrides(cli))
}
