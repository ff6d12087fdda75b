//! Nearest-centroid crop predictor
//!
//! Loads per-crop feature centroids from a JSON model file and labels a reading with
//! the closest crop under a per-feature scaled Euclidean distance.
//!
//! Model file:
//! ```json
//! {
//!   "scale": [140.0, 145.0, 205.0, 6.4, 35.0, 85.0, 280.0],
//!   "classes": [
//!     {"label": "rice", "centroid": [80.0, 48.0, 40.0, 6.4, 23.7, 82.3, 236.2]}
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::predictor::{CropPredictor, PredictorError};
use crate::soil::{SoilReading, FEATURE_COUNT, FEATURE_RANGES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropCentroid {
    pub label: String,
    pub centroid: [f64; FEATURE_COUNT],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentroidModel {
    /// Per-feature divisor applied before measuring distance
    pub scale: [f64; FEATURE_COUNT],
    pub classes: Vec<CropCentroid>,
}

#[derive(Debug, Clone)]
pub struct CentroidPredictor {
    model: CentroidModel,
}

impl CentroidPredictor {
    /// Validate a model: at least one class, positive finite scales, finite centroids
    pub fn from_model(model: CentroidModel) -> Result<Self, PredictorError> {
        if model.classes.is_empty() {
            return Err(PredictorError::Unavailable("model has no crop classes".to_string()));
        }
        if let Some((idx, s)) = model
            .scale
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || **s <= 0.0)
        {
            return Err(PredictorError::Unavailable(format!(
                "scale for '{}' must be positive, got {}",
                FEATURE_RANGES[idx].name, s
            )));
        }
        if let Some(class) = model
            .classes
            .iter()
            .find(|c| c.centroid.iter().any(|v| !v.is_finite()))
        {
            return Err(PredictorError::Unavailable(format!(
                "centroid for '{}' has non-finite values",
                class.label
            )));
        }
        Ok(Self { model })
    }

    /// Load a model file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read predictor model: {:?}", path))?;
        let model: CentroidModel = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse predictor model: {:?}", path))?;
        let predictor = Self::from_model(model)
            .with_context(|| format!("Invalid predictor model: {:?}", path))?;
        tracing::info!(
            "Loaded centroid predictor with {} crop classes from {:?}",
            predictor.model.classes.len(),
            path
        );
        Ok(predictor)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.model.classes.iter().map(|c| c.label.as_str())
    }

    /// Scaled squared distance between a feature vector and a centroid
    pub fn scaled_distance(&self, features: &[f64; FEATURE_COUNT], centroid: &[f64; FEATURE_COUNT]) -> f64 {
        features
            .iter()
            .zip(centroid.iter())
            .zip(self.model.scale.iter())
            .map(|((x, c), s)| {
                let d = (x - c) / s;
                d * d
            })
            .sum()
    }
}

impl CropPredictor for CentroidPredictor {
    fn predict(&self, reading: &SoilReading) -> Result<String, PredictorError> {
        let features = reading.features();
        if let Some((idx, value)) = features.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(PredictorError::InvalidFeature {
                feature: FEATURE_RANGES[idx].name,
                value: *value,
            });
        }

        let mut best: Option<(&str, f64)> = None;
        for class in &self.model.classes {
            let distance = self.scaled_distance(&features, &class.centroid);
            // Strict comparison keeps the earliest class on ties
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((class.label.as_str(), distance));
            }
        }

        best.map(|(label, _)| label.to_string())
            .ok_or_else(|| PredictorError::Unavailable("model has no crop classes".to_string()))
    }
}
