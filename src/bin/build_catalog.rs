//! Build the Plan Catalog from the Plan Store
//!
//! Expands every base plan into its standard variants and writes the catalog
//! plus its `.meta.json` build record. Malformed crops are reported and skipped.
//!
//! Usage:
//!   cargo run --bin build_catalog
//!   PLAN_STORE_PATH=plans.json CATALOG_PATH=out/catalog.json cargo run --bin build_catalog

use anyhow::Result;
use chrono::Utc;
use crop_planner::catalog::{self, persist::metadata_path, BuildMetadata};
use crop_planner::{EngineConfig, PlanStore};
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
    println!("Plan Catalog Build");
    println!("{}", "=".repeat(70));
    println!("  Plan store: {:?}", config.plan_store_path);
    println!("  Catalog:    {:?}", config.catalog_path);
    println!();

    let start = Instant::now();
    let store = PlanStore::load(&config.plan_store_path)?;
    let build = catalog::build(&store);
    let metadata = BuildMetadata::for_build(&build, Utc::now());
    catalog::write_catalog(&config.catalog_path, &build.catalog, &metadata)?;
    let elapsed = start.elapsed();

    println!("Crops in store:   {}", store.len());
    println!("Crops cataloged:  {}", metadata.crop_count);
    println!("Crops skipped:    {}", metadata.skipped.len());
    for skipped in &metadata.skipped {
        println!("  - {}: {}", skipped.crop, skipped.reason);
    }
    println!();
    println!("Last built:       {}", metadata.last_built.to_rfc3339());
    println!("Metadata:         {:?}", metadata_path(&config.catalog_path));
    println!("Elapsed:          {:.3} ms", elapsed.as_secs_f64() * 1000.0);
    println!("{}", "=".repeat(70));

    Ok(())
}
