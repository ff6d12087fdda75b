//! Recommend crops for every soil sample in a CSV file
//!
//! Readings outside the accepted feature ranges are counted and left out. Prints a
//! per-crop tally and how many predictions have no implementation plan.
//!
//! Usage:
//!   cargo run --release --bin recommend_batch
//!   SOIL_SAMPLES_PATH=field_survey.csv cargo run --release --bin recommend_batch

use anyhow::Result;
use crop_planner::{
    catalog, load_soil_samples, CatalogHandle, CentroidPredictor, EngineConfig, PlanStore,
    RecommendationService, SoilReading,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Instant;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crop_planner=info,warn".into()),
        )
        .init();

    let config = EngineConfig::from_env();

    println!("\n{}", "=".repeat(70));
    println!("Batch Crop Recommendation");
    println!("{}", "=".repeat(70));
    println!();

    let init_start = Instant::now();
    let predictor = CentroidPredictor::load(&config.model_path)?;
    let catalog = if config.catalog_path.exists() {
        catalog::read_catalog(&config.catalog_path)?
    } else {
        catalog::build(&PlanStore::load(&config.plan_store_path)?).catalog
    };
    let service = RecommendationService::new(Arc::new(predictor), CatalogHandle::new(catalog));
    let samples = load_soil_samples(&config.soil_samples_path)?;
    let init_time = init_start.elapsed();

    let (valid, invalid): (Vec<SoilReading>, Vec<SoilReading>) =
        samples.into_iter().partition(|r| r.validate().is_ok());

    let run_start = Instant::now();
    let results = service.recommend_batch(&valid);
    let run_time = run_start.elapsed();

    let mut tally: FxHashMap<String, usize> = FxHashMap::default();
    let mut without_plan = 0usize;
    let mut failures = 0usize;
    for result in &results {
        match result {
            Ok(prediction) => {
                *tally.entry(prediction.predicted_crop.clone()).or_insert(0) += 1;
                if !prediction.plan_available {
                    without_plan += 1;
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!("Prediction failed: {}", e);
            }
        }
    }

    let mut ranked: Vec<(String, usize)> = tally.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    println!("Samples:              {}", valid.len() + invalid.len());
    println!("Out of range:         {}", invalid.len());
    println!("Prediction failures:  {}", failures);
    println!("Without plan:         {}", without_plan);
    println!();
    println!("{:<20} {:>8}", "Crop", "Count");
    println!("{}", "-".repeat(29));
    for (crop, count) in &ranked {
        println!("{:<20} {:>8}", crop, count);
    }
    println!();
    println!("Load time:            {:.3} ms", init_time.as_secs_f64() * 1000.0);
    println!("Recommendation time:  {:.3} ms", run_time.as_secs_f64() * 1000.0);
    println!("{}", "=".repeat(70));

    Ok(())
}
