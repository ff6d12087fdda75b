//! Plan Catalog Builder
//!
//! Expands every crop in the Plan Store into the four standard variants. Crops are
//! expanded in parallel with Rayon and collected back in store order, so two builds
//! from the same store are identical.
//!
//! Malformed store entries are skipped and reported; they never abort the batch.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::types::{Catalog, CropCatalogEntry};
use crate::error::MalformedPlanError;
use crate::plan::store::{parse_entry, PlanStore};
use crate::plan::{expand, Plan, VariantTag};

/// A crop left out of the catalog and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCrop {
    pub crop: String,
    pub reason: String,
}

impl From<&MalformedPlanError> for SkippedCrop {
    fn from(err: &MalformedPlanError) -> Self {
        Self {
            crop: err.crop.clone(),
            reason: err.reason.to_string(),
        }
    }
}

/// Result of a catalog build: the catalog plus every crop that was skipped
#[derive(Debug, Clone)]
pub struct CatalogBuild {
    pub catalog: Catalog,
    pub skipped: Vec<MalformedPlanError>,
}

impl CatalogBuild {
    pub fn skipped_crops(&self) -> Vec<SkippedCrop> {
        self.skipped.iter().map(SkippedCrop::from).collect()
    }
}

/// Build one catalog entry from a parsed base plan
pub fn build_entry(base: &Plan) -> CropCatalogEntry {
    let variants: IndexMap<VariantTag, Plan> = VariantTag::STANDARD
        .iter()
        .map(|tag| {
            let plan = if tag.is_default() {
                base.clone()
            } else {
                expand(base, tag)
            };
            (tag.clone(), plan)
        })
        .collect();

    debug_assert!(variants.values().all(|plan| plan.same_shape(base)));

    CropCatalogEntry {
        summary: base.summary.clone(),
        duration_weeks: base.duration_weeks.clone(),
        variants,
    }
}

/// Build a catalog from already-parsed base plans
pub fn build_from_plans(plans: &IndexMap<String, Plan>) -> Catalog {
    let pairs: Vec<(&String, &Plan)> = plans.iter().collect();
    let entries: IndexMap<String, CropCatalogEntry> = pairs
        .par_iter()
        .map(|(crop, plan)| ((*crop).clone(), build_entry(plan)))
        .collect::<Vec<_>>()
        .into_iter()
        .collect();
    Catalog::from_entries(entries)
}

/// Build the catalog from a Plan Store
///
/// An empty store produces an empty catalog.
pub fn build(store: &PlanStore) -> CatalogBuild {
    let raw: Vec<(&str, &serde_json::Value)> = store.raw_entries().collect();

    let results: Vec<(String, Result<CropCatalogEntry, MalformedPlanError>)> = raw
        .par_iter()
        .map(|(crop, value)| {
            let entry = parse_entry(crop, value).map(|plan| build_entry(&plan));
            (crop.to_string(), entry)
        })
        .collect();

    let mut entries = IndexMap::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (crop, result) in results {
        match result {
            Ok(entry) => {
                entries.insert(crop, entry);
            }
            Err(err) => {
                tracing::warn!("Skipping crop '{}': {}", err.crop, err.reason);
                skipped.push(err);
            }
        }
    }

    tracing::info!(
        "Built catalog: {} crops, {} skipped",
        entries.len(),
        skipped.len()
    );

    CatalogBuild {
        catalog: Catalog::from_entries(entries),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PlanField, Scalar};
    use serde_json::json;

    fn store() -> PlanStore {
        PlanStore::from_json_str(
            &json!({
                "rice": {
                    "summary": "Rice growing",
                    "duration_weeks": 16,
                    "fertilization": ["Apply urea at week 2"],
                    "irrigation": {"week1": ["Flood field"]}
                },
                "broken": {"summary": "No duration"},
                "maize": {
                    "summary": "Maize",
                    "duration_weeks": "14-16",
                    "sowing": ["Drill seeds 5cm deep"]
                }
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_four_variants_in_order() {
        let build = build(&store());
        let entry = build.catalog.entry("rice").unwrap();
        assert_eq!(entry.variant_tags().as_slice(), &VariantTag::STANDARD);
    }

    #[test]
    fn test_default_is_base_plan() {
        let store = store();
        let build = build(&store);
        let base = store.plan("rice").unwrap().unwrap();
        assert_eq!(build.catalog.entry("rice").unwrap().base_plan(), Some(&base));
    }

    #[test]
    fn test_malformed_crop_skipped_not_fatal() {
        let build = build(&store());
        assert_eq!(build.catalog.crop_names().collect::<Vec<_>>(), vec!["rice", "maize"]);
        assert_eq!(build.skipped.len(), 1);
        assert_eq!(build.skipped[0].crop, "broken");
        assert_eq!(build.skipped_crops()[0].reason, "missing required key 'duration_weeks'");
    }

    #[test]
    fn test_empty_store_empty_catalog() {
        let build = build(&PlanStore::default());
        assert!(build.catalog.is_empty());
        assert!(build.skipped.is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let store = store();
        let first = build(&store).catalog.to_json_pretty().unwrap();
        let second = build(&store).catalog.to_json_pretty().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_entry_carries_base_scalars() {
        let build = build(&store());
        let maize = build.catalog.entry("maize").unwrap();
        assert_eq!(maize.summary, "Maize");
        assert_eq!(maize.duration_weeks, Scalar::from("14-16"));
        let organic = maize.plan(&VariantTag::Organic).unwrap();
        assert_eq!(organic.duration_weeks, Scalar::from("14-16"));
        assert!(matches!(organic.stage("sowing"), Some(PlanField::List(items)) if items.len() == 2));
    }

    #[test]
    fn test_build_from_plans_matches_store_build() {
        let store = store();
        let plans: IndexMap<String, Plan> = store
            .crop_names()
            .filter_map(|crop| store.plan(crop)?.ok().map(|plan| (crop.to_string(), plan)))
            .collect();
        assert_eq!(build_from_plans(&plans), build(&store).catalog);
    }
}
