//! Recommendation Service
//!
//! Soil reading → predicted crop → catalog entry. An unknown crop is a normal
//! outcome (reported with `plan_available = false`), only predictor failures are
//! errors.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::catalog::{Catalog, CatalogHandle, CropCatalogEntry, VariantList};
use crate::plan::{Plan, VariantTag};
use crate::predictor::{CropPredictor, PredictorError};
use crate::soil::SoilReading;

/// Outcome of one recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Label exactly as the predictor returned it
    pub predicted_crop: String,
    /// Catalog key the label resolved to, when it differs only by case or whitespace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_crop: Option<String>,
    pub plan_available: bool,
    pub variants_available: VariantList,
}

/// Prediction plus borrowed access to the matching catalog entry
#[derive(Debug, Clone)]
pub struct Recommendation<'c> {
    pub result: PredictionResult,
    entry: Option<&'c CropCatalogEntry>,
}

impl<'c> Recommendation<'c> {
    /// Plan for a caller-selected variant
    pub fn plan(&self, variant: &VariantTag) -> Option<&'c Plan> {
        self.entry.and_then(|entry| entry.plan(variant))
    }

    pub fn entry(&self) -> Option<&'c CropCatalogEntry> {
        self.entry
    }

    pub fn into_result(self) -> PredictionResult {
        self.result
    }
}

/// Predict a crop for `reading` and look up its plans
pub fn recommend<'c, P: CropPredictor + ?Sized>(
    reading: &SoilReading,
    predictor: &P,
    catalog: &'c Catalog,
) -> Result<Recommendation<'c>, PredictorError> {
    let predicted_crop = predictor.predict(reading)?;

    let Some((crop, entry)) = catalog.resolve(&predicted_crop) else {
        tracing::debug!("No implementation plan for predicted crop '{}'", predicted_crop);
        return Ok(Recommendation {
            result: PredictionResult {
                predicted_crop,
                catalog_crop: None,
                plan_available: false,
                variants_available: VariantList::new(),
            },
            entry: None,
        });
    };

    let catalog_crop = (crop != predicted_crop).then(|| crop.to_string());
    Ok(Recommendation {
        result: PredictionResult {
            predicted_crop,
            catalog_crop,
            plan_available: true,
            variants_available: entry.variant_tags(),
        },
        entry: Some(entry),
    })
}

/// Prediction with the selected plan attached, detached from any catalog snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_variant: Option<VariantTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
}

/// Long-lived service: a predictor plus a swappable catalog
#[derive(Clone)]
pub struct RecommendationService {
    predictor: Arc<dyn CropPredictor>,
    catalog: CatalogHandle,
}

impl RecommendationService {
    pub fn new(predictor: Arc<dyn CropPredictor>, catalog: CatalogHandle) -> Self {
        Self { predictor, catalog }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.current()
    }

    pub fn catalog_handle(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn recommend(&self, reading: &SoilReading) -> Result<PredictionResult, PredictorError> {
        let catalog = self.catalog.current();
        recommend(reading, self.predictor.as_ref(), &catalog).map(Recommendation::into_result)
    }

    /// Recommend and attach the plan for `variant` (default plan when `None`)
    pub fn recommend_with_plan(
        &self,
        reading: &SoilReading,
        variant: Option<&VariantTag>,
    ) -> Result<RecommendationResponse, PredictorError> {
        let catalog = self.catalog.current();
        let recommendation = recommend(reading, self.predictor.as_ref(), &catalog)?;

        let selected = variant.cloned().unwrap_or(VariantTag::Default);
        let plan = recommendation.plan(&selected).cloned();
        let selected_variant = plan.as_ref().map(|_| selected);

        Ok(RecommendationResponse {
            result: recommendation.into_result(),
            selected_variant,
            plan,
        })
    }

    /// Recommend for many readings in parallel; results keep input order
    pub fn recommend_batch(
        &self,
        readings: &[SoilReading],
    ) -> Vec<Result<PredictionResult, PredictorError>> {
        let catalog = self.catalog.current();
        let predictor = self.predictor.as_ref();
        readings
            .par_iter()
            .map(|reading| {
                recommend(reading, predictor, &catalog).map(Recommendation::into_result)
            })
            .collect()
    }
}
