//! Domain errors
//!
//! Loader and I/O paths use `anyhow` with context; the types here are the
//! errors callers are expected to match on.

use thiserror::Error;

/// Why a plan document could not be turned into a [`crate::Plan`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanShapeError {
    #[error("plan is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },

    #[error("missing required key '{key}'")]
    MissingKey { key: &'static str },

    #[error("'summary' must be a string (found {found})")]
    InvalidSummary { found: &'static str },

    #[error("'duration_weeks' must be a number or string (found {found})")]
    InvalidDuration { found: &'static str },

    #[error("stage '{stage}' item {index} is not a string (found {found})")]
    NonStringItem {
        stage: String,
        index: usize,
        found: &'static str,
    },

    #[error("stage '{stage}' sub-stage '{sub_stage}' nests deeper than one level")]
    NestedTooDeep { stage: String, sub_stage: String },
}

/// A Plan Store entry that cannot be expanded
///
/// Raised per crop during catalog build; the builder skips the crop and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed plan for crop '{crop}': {reason}")]
pub struct MalformedPlanError {
    pub crop: String,
    #[source]
    pub reason: PlanShapeError,
}

/// Explicit catalog lookups (crop browsing, plan selection)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogLookupError {
    #[error("no implementation plan available for crop '{crop}'")]
    UnknownCrop { crop: String },

    #[error("crop '{crop}' has no '{variant}' variant")]
    UnknownVariant { crop: String, variant: String },
}

/// A persisted catalog entry that no build could have produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogEntryError {
    #[error("crop '{crop}' has variants [{found}], expected [default, high_yield, organic, low_input]")]
    NonStandardVariants { crop: String, found: String },

    #[error("crop '{crop}': '{variant}' plan does not have the shape of the default plan")]
    ShapeMismatch { crop: String, variant: String },

    #[error("crop '{crop}': entry summary and duration_weeks must match the default plan")]
    HeaderMismatch { crop: String },
}

/// Short JSON type name for error messages
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
