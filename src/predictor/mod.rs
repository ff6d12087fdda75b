//! Crop Predictor boundary
//!
//! The classifier is a black box behind [`CropPredictor`]: seven features in, one crop
//! label out. How the model was trained is not this crate's concern.

pub mod centroid;

pub use centroid::{CentroidModel, CentroidPredictor, CropCentroid};

use thiserror::Error;

use crate::soil::SoilReading;

/// The predictor could not produce a label
///
/// Propagated to the caller unchanged; nothing in the crate retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictorError {
    #[error("feature '{feature}' is not a finite number ({value})")]
    InvalidFeature { feature: &'static str, value: f64 },

    #[error("predictor unavailable: {0}")]
    Unavailable(String),
}

/// Trained tabular classifier mapping soil readings to crop labels
pub trait CropPredictor: Send + Sync {
    fn predict(&self, reading: &SoilReading) -> Result<String, PredictorError>;
}

impl<P: CropPredictor + ?Sized> CropPredictor for std::sync::Arc<P> {
    fn predict(&self, reading: &SoilReading) -> Result<String, PredictorError> {
        (**self).predict(reading)
    }
}
