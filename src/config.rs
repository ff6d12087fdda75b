//! Runtime configuration from environment variables
//!
//! - `DATA_DIR`: base directory for data files (default `data`)
//! - `PLAN_STORE_PATH`: base plans (default `$DATA_DIR/plan_store.json`)
//! - `CATALOG_PATH`: built catalog (default `$DATA_DIR/catalog.json`)
//! - `MODEL_PATH`: predictor model (default `$DATA_DIR/crop_centroids.json`)
//! - `SOIL_SAMPLES_PATH`: CSV batch input (default `$DATA_DIR/soil_samples.csv`)
//! - `PORT`: API server port (default 3000)

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub plan_store_path: PathBuf,
    pub catalog_path: PathBuf,
    pub model_path: PathBuf,
    pub soil_samples_path: PathBuf,
    pub port: u16,
}

impl EngineConfig {
    pub const DEFAULT_PORT: u16 = 3000;

    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            plan_store_path: data_dir.join("plan_store.json"),
            catalog_path: data_dir.join("catalog.json"),
            model_path: data_dir.join("crop_centroids.json"),
            soil_samples_path: data_dir.join("soil_samples.csv"),
            port: Self::DEFAULT_PORT,
            data_dir,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, test fixtures)
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let data_dir = lookup("DATA_DIR").unwrap_or_else(|| "data".to_string());
        let mut config = Self::with_data_dir(data_dir);

        if let Some(path) = lookup("PLAN_STORE_PATH") {
            config.plan_store_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CATALOG_PATH") {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("MODEL_PATH") {
            config.model_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("SOIL_SAMPLES_PATH") {
            config.soil_samples_path = PathBuf::from(path);
        }
        config.port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(Self::DEFAULT_PORT);

        config
    }

    pub fn log_summary(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  DATA_DIR: {:?}", self.data_dir);
        tracing::info!("  PLAN_STORE_PATH: {:?}", self.plan_store_path);
        tracing::info!("  CATALOG_PATH: {:?}", self.catalog_path);
        tracing::info!("  MODEL_PATH: {:?}", self.model_path);
        tracing::info!("  PORT: {}", self.port);
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_data_dir("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(|_| None);
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.catalog_path, PathBuf::from("data/catalog.json"));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("DATA_DIR", "/srv/crops"),
            ("MODEL_PATH", "/models/v2.json"),
            ("PORT", "8080"),
        ]
        .into_iter()
        .collect();
        let config = EngineConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.plan_store_path, PathBuf::from("/srv/crops/plan_store.json"));
        assert_eq!(config.model_path, PathBuf::from("/models/v2.json"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = EngineConfig::from_lookup(|key| (key == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.port, EngineConfig::DEFAULT_PORT);
    }
}
