// Catalog Pipeline Integration Tests
//
// Purpose: Plan Store → Catalog → disk → reload → recommendation, end to end
// Run with: cargo test --test catalog_pipeline_tests

use chrono::{TimeZone, Utc};
use crop_planner::catalog::{self, persist::metadata_path, BuildMetadata};
use crop_planner::{
    CatalogHandle, CentroidPredictor, PlanStore, RecommendationService, SoilReading, VariantTag,
};
use std::fs;
use std::sync::Arc;

const PLAN_STORE: &str = r#"{
    "rice": {
        "summary": "Rice cultivation plan",
        "duration_weeks": 16,
        "land_preparation": ["Puddle the field", "Level with a plank"],
        "fertilization": ["Apply urea at week 2", "Top-dress at panicle initiation"],
        "irrigation": {"week1": ["Flood field to 5 cm"], "week6": ["Drain before harvest"]}
    },
    "broken": {"summary": "No duration here"},
    "chickpea": {
        "summary": "Chickpea cultivation plan",
        "duration_weeks": "14-16",
        "sowing": ["Sow at 30 cm row spacing"],
        "pest_management": {"flowering": ["Scout for pod borer"]}
    }
}"#;

const MODEL: &str = r#"{
    "scale": [140.0, 145.0, 205.0, 6.4, 35.0, 85.0, 280.0],
    "classes": [
        {"label": "rice", "centroid": [80.0, 48.0, 40.0, 6.4, 23.7, 82.3, 236.2]},
        {"label": "chickpea", "centroid": [40.1, 67.8, 79.9, 7.3, 18.9, 16.9, 80.1]},
        {"label": "mango", "centroid": [20.1, 27.2, 29.9, 5.8, 31.2, 50.2, 94.7]}
    ]
}"#;

fn write_inputs(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let store_path = dir.join("plan_store.json");
    let model_path = dir.join("crop_centroids.json");
    fs::write(&store_path, PLAN_STORE).unwrap();
    fs::write(&model_path, MODEL).unwrap();
    (store_path, model_path)
}

#[test]
fn test_build_skips_malformed_and_keeps_order() {
    let store = PlanStore::from_json_str(PLAN_STORE).unwrap();
    let build = catalog::build(&store);

    let crops: Vec<&str> = build.catalog.crop_names().collect();
    assert_eq!(crops, vec!["rice", "chickpea"]);

    let skipped = build.skipped_crops();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].crop, "broken");
    assert!(skipped[0].reason.contains("duration_weeks"));
}

#[test]
fn test_persisted_catalog_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let (store_path, _) = write_inputs(dir.path());
    let catalog_path = dir.path().join("out").join("catalog.json");

    let store = PlanStore::load(&store_path).unwrap();
    let build = catalog::build(&store);
    let metadata = BuildMetadata::for_build(&build, Utc::now());
    catalog::write_catalog(&catalog_path, &build.catalog, &metadata).unwrap();

    let reloaded = catalog::read_catalog(&catalog_path).unwrap();
    assert_eq!(reloaded, build.catalog);

    let meta = catalog::read_metadata(&catalog_path).unwrap().unwrap();
    assert_eq!(meta.crop_count, 2);
    assert_eq!(meta.skipped.len(), 1);
    assert!(metadata_path(&catalog_path).exists());
}

#[test]
fn test_rebuild_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let (store_path, _) = write_inputs(dir.path());
    let catalog_path = dir.path().join("catalog.json");
    let store = PlanStore::load(&store_path).unwrap();

    let first = catalog::build(&store);
    let first_meta = BuildMetadata::for_build(&first, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    catalog::write_catalog(&catalog_path, &first.catalog, &first_meta).unwrap();
    let first_bytes = fs::read(&catalog_path).unwrap();

    let second = catalog::build(&store);
    let second_meta = BuildMetadata::for_build(&second, Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap());
    catalog::write_catalog(&catalog_path, &second.catalog, &second_meta).unwrap();
    let second_bytes = fs::read(&catalog_path).unwrap();

    assert_eq!(first_bytes, second_bytes);
    let meta = catalog::read_metadata(&catalog_path).unwrap().unwrap();
    assert_eq!(meta.last_built, second_meta.last_built);
}

#[test]
fn test_persisted_document_layout() {
    let store = PlanStore::from_json_str(PLAN_STORE).unwrap();
    let catalog = catalog::build(&store).catalog;
    let doc: serde_json::Value = serde_json::from_str(&catalog.to_json_pretty().unwrap()).unwrap();

    let rice = &doc["rice"];
    assert_eq!(rice["summary"], "Rice cultivation plan");
    assert_eq!(rice["duration_weeks"], 16);
    let variants: Vec<&str> = rice["variants"]
        .as_object()
        .unwrap()
        .keys()
        .map(|k| k.as_str())
        .collect();
    assert_eq!(variants, vec!["default", "high_yield", "organic", "low_input"]);

    let organic = &rice["variants"]["organic"];
    assert_eq!(organic["summary"], "Rice cultivation plan (Organic variant)");
    assert_eq!(
        organic["land_preparation"][0],
        "Prefer well-decomposed compost/FYM and biofertilizers"
    );
    assert_eq!(
        organic["irrigation"]["week6"],
        serde_json::json!(["Use organic inputs like compost, rock phosphate", "Drain before harvest"])
    );
    assert_eq!(doc["chickpea"]["variants"]["low_input"]["duration_weeks"], "14-16");
}

#[test]
fn test_end_to_end_recommendation() {
    let dir = tempfile::tempdir().unwrap();
    let (store_path, model_path) = write_inputs(dir.path());
    let catalog_path = dir.path().join("catalog.json");

    let build = catalog::build(&PlanStore::load(&store_path).unwrap());
    catalog::write_catalog(&catalog_path, &build.catalog, &BuildMetadata::for_build(&build, Utc::now()))
        .unwrap();

    let predictor = CentroidPredictor::load(&model_path).unwrap();
    let service = RecommendationService::new(
        Arc::new(predictor),
        CatalogHandle::new(catalog::read_catalog(&catalog_path).unwrap()),
    );

    let paddy = SoilReading::from_features([85.0, 45.0, 38.0, 6.2, 24.0, 80.0, 230.0]);
    let response = service
        .recommend_with_plan(&paddy, Some(&VariantTag::HighYield))
        .unwrap();
    assert_eq!(response.result.predicted_crop, "rice");
    assert!(response.result.plan_available);
    assert_eq!(response.result.variants_available.as_slice(), &VariantTag::STANDARD);
    let plan = response.plan.unwrap();
    assert_eq!(plan.summary, "Rice cultivation plan (High Yield variant)");

    // Predictor knows mango, the Plan Store does not
    let orchard = SoilReading::from_features([20.0, 27.0, 30.0, 5.8, 31.0, 50.0, 95.0]);
    let result = service.recommend(&orchard).unwrap();
    assert_eq!(result.predicted_crop, "mango");
    assert!(!result.plan_available);
    assert!(result.variants_available.is_empty());
}

#[test]
fn test_handle_swap_visible_to_service() {
    let store = PlanStore::from_json_str(PLAN_STORE).unwrap();
    let handle = CatalogHandle::new(catalog::build(&store).catalog);
    let predictor = CentroidPredictor::from_model(serde_json::from_str(MODEL).unwrap()).unwrap();
    let service = RecommendationService::new(Arc::new(predictor), handle.clone());

    let orchard = SoilReading::from_features([20.0, 27.0, 30.0, 5.8, 31.0, 50.0, 95.0]);
    assert!(!service.recommend(&orchard).unwrap().plan_available);

    let mut store = store;
    store.insert(
        "mango",
        serde_json::json!({"summary": "Mango orchard plan", "duration_weeks": 52, "planting": ["Pit 1 m cube"]}),
    );
    let previous = handle.replace(catalog::build(&store).catalog);
    assert_eq!(previous.len(), 2);

    let result = service.recommend(&orchard).unwrap();
    assert!(result.plan_available);
    assert_eq!(service.catalog().len(), 3);
}

#[test]
fn test_shipped_data_is_consistent() {
    let data_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data");

    let build = catalog::build(&PlanStore::load(&data_dir.join("plan_store.json")).unwrap());
    assert!(build.skipped.is_empty());
    assert_eq!(build.catalog.len(), 6);

    let predictor = CentroidPredictor::load(&data_dir.join("crop_centroids.json")).unwrap();
    let samples = crop_planner::load_soil_samples(&data_dir.join("soil_samples.csv")).unwrap();
    assert_eq!(samples.len(), 11);
    assert!(samples.iter().all(|s| s.validate().is_ok()));

    let service = RecommendationService::new(Arc::new(predictor), CatalogHandle::new(build.catalog));
    let results = service.recommend_batch(&samples);
    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(results[0].as_ref().unwrap().predicted_crop, "rice");
}
