//! Plan Store
//!
//! Raw base plans keyed by crop, in document order. Entries stay as JSON until the
//! catalog builder parses them, so one malformed crop never blocks loading the rest.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::MalformedPlanError;
use crate::plan::types::Plan;

#[derive(Debug, Clone, Default)]
pub struct PlanStore {
    entries: IndexMap<String, Value>,
}

impl PlanStore {
    pub fn new(entries: IndexMap<String, Value>) -> Self {
        Self { entries }
    }

    /// Load a Plan Store document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan store: {:?}", path))?;
        let store = Self::from_json_str(&contents)
            .with_context(|| format!("Failed to parse plan store: {:?}", path))?;
        tracing::info!("Loaded plan store with {} crops from {:?}", store.len(), path);
        Ok(store)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let entries: IndexMap<String, Value> = serde_json::from_str(contents)
            .with_context(|| "Plan store must be a JSON object keyed by crop name")?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn crop_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Raw entries in document order
    pub fn raw_entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(crop, value)| (crop.as_str(), value))
    }

    /// Parse the base plan for one crop; `None` if the crop is not in the store
    pub fn plan(&self, crop: &str) -> Option<Result<Plan, MalformedPlanError>> {
        self.entries.get(crop).map(|value| parse_entry(crop, value))
    }

    pub fn insert(&mut self, crop: impl Into<String>, plan: Value) {
        self.entries.insert(crop.into(), plan);
    }
}

pub(crate) fn parse_entry(crop: &str, value: &Value) -> Result<Plan, MalformedPlanError> {
    Plan::from_value(value).map_err(|reason| MalformedPlanError {
        crop: crop.to_string(),
        reason,
    })
}
