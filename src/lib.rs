//! Crop Planner
//!
//! Soil reading → recommended crop → implementation plan, in one of several
//! management variants.
//!
//! - `plan/`: Plan model, variant tags, the Plan Store and the Variant Expander
//! - `catalog/`: Plan Catalog building, persistence and hot-swappable access
//! - `soil`: Soil readings, feature ranges and CSV loading with Polars
//! - `predictor/`: Crop Predictor boundary and the nearest-centroid adapter
//! - `recommendation`: Recommendation Service
//! - `config`: Environment-driven paths and port
//! - `api_server`: Axum HTTP surface (feature `api`)

pub mod error;
pub mod plan;
pub mod catalog;
pub mod soil;
pub mod predictor;
pub mod recommendation;
pub mod config;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use error::{CatalogEntryError, CatalogLookupError, MalformedPlanError, PlanShapeError};
pub use plan::{expand, Plan, PlanField, PlanStore, Scalar, VariantTag};
pub use catalog::{build, BuildMetadata, Catalog, CatalogBuild, CatalogHandle, CropCatalogEntry};
pub use soil::{load_soil_samples, SoilReading};
pub use predictor::{CentroidPredictor, CropPredictor, PredictorError};
pub use recommendation::{recommend, PredictionResult, Recommendation, RecommendationResponse, RecommendationService};
pub use config::EngineConfig;

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
