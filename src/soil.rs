//! Soil Readings
//!
//! The seven soil/climate measurements the crop predictor consumes, their plausible
//! input ranges, and a Polars loader for CSV batches of samples.
//!
//! Range checks are a boundary concern: `recommend` never calls `validate`.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of features the predictor expects
pub const FEATURE_COUNT: usize = 7;

/// Soil and climate measurements for one field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub ph: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
}

/// Documented plausible range of one feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRange {
    pub name: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    /// Column name in the soil sample CSV
    pub csv_column: &'static str,
}

/// Feature ranges in predictor order: N, P, K, pH, temperature, humidity, rainfall
pub const FEATURE_RANGES: [FeatureRange; FEATURE_COUNT] = [
    FeatureRange { name: "nitrogen", unit: "ppm", min: 0.0, max: 200.0, csv_column: "Nitrogen_N" },
    FeatureRange { name: "phosphorus", unit: "ppm", min: 0.0, max: 200.0, csv_column: "phosphorus_P" },
    FeatureRange { name: "potassium", unit: "ppm", min: 0.0, max: 200.0, csv_column: "Potassium_K" },
    FeatureRange { name: "ph", unit: "", min: 0.0, max: 14.0, csv_column: "pH" },
    FeatureRange { name: "temperature", unit: "°C", min: -10.0, max: 50.0, csv_column: "Temperature" },
    FeatureRange { name: "humidity", unit: "%", min: 0.0, max: 100.0, csv_column: "Humidity" },
    FeatureRange { name: "rainfall", unit: "cm", min: 0.0, max: 500.0, csv_column: "Rainfall(cm)" },
];

/// One out-of-range (or non-finite) feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeViolation {
    pub feature: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} (expected {}..={})", self.feature, self.value, self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("soil reading out of range: {}", format_violations(.violations))]
pub struct SoilValidationError {
    pub violations: Vec<RangeViolation>,
}

fn format_violations(violations: &[RangeViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SoilReading {
    /// Feature vector in predictor order
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.nitrogen,
            self.phosphorus,
            self.potassium,
            self.ph,
            self.temperature,
            self.humidity,
            self.rainfall,
        ]
    }

    pub fn from_features(features: [f64; FEATURE_COUNT]) -> Self {
        let [nitrogen, phosphorus, potassium, ph, temperature, humidity, rainfall] = features;
        Self {
            nitrogen,
            phosphorus,
            potassium,
            ph,
            temperature,
            humidity,
            rainfall,
        }
    }

    /// Check every feature against its documented range
    pub fn validate(&self) -> Result<(), SoilValidationError> {
        let violations: Vec<RangeViolation> = self
            .features()
            .iter()
            .zip(FEATURE_RANGES.iter())
            .filter(|(value, range)| !value.is_finite() || **value < range.min || **value > range.max)
            .map(|(value, range)| RangeViolation {
                feature: range.name,
                value: *value,
                min: range.min,
                max: range.max,
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SoilValidationError { violations })
        }
    }
}

/// Load soil samples from CSV
///
/// Columns may use the dataset names (`Nitrogen_N`, `phosphorus_P`, ...) or the
/// field names (`nitrogen`, `phosphorus`, ...). Extra columns are ignored.
pub fn load_soil_samples(path: &Path) -> Result<Vec<SoilReading>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to load soil samples CSV: {:?}", path))?;

    let samples = readings_from_frame(&df)
        .with_context(|| format!("Invalid soil samples in {:?}", path))?;
    tracing::info!("Loaded {} soil samples from {:?}", samples.len(), path);
    Ok(samples)
}

/// Convert a DataFrame with the seven feature columns into readings
pub fn readings_from_frame(df: &DataFrame) -> Result<Vec<SoilReading>> {
    let mut columns: Vec<Float64Chunked> = Vec::with_capacity(FEATURE_COUNT);
    for range in FEATURE_RANGES.iter() {
        let column = df
            .column(range.csv_column)
            .or_else(|_| df.column(range.name))
            .with_context(|| {
                format!("Column '{}' (or '{}') not found", range.csv_column, range.name)
            })?;
        let values = column
            .cast(&DataType::Float64)
            .with_context(|| format!("Column '{}' is not numeric", range.name))?;
        let values = values
            .f64()
            .with_context(|| format!("Column '{}' is not numeric", range.name))?
            .clone();
        columns.push(values);
    }

    let mut readings = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let mut features = [0.0; FEATURE_COUNT];
        for (slot, (values, range)) in features.iter_mut().zip(columns.iter().zip(FEATURE_RANGES.iter())) {
            *slot = values
                .get(row)
                .with_context(|| format!("Row {} has no value for '{}'", row + 1, range.name))?;
        }
        readings.push(SoilReading::from_features(features));
    }
    Ok(readings)
}
