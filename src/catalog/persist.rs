//! Catalog persistence
//!
//! The catalog document holds only crop entries, so rebuilding from an unchanged
//! Plan Store rewrites the same bytes. Build metadata (`last_built`, skipped crops)
//! goes to a sidecar file next to it: `catalog.json` → `catalog.meta.json`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::catalog::builder::{CatalogBuild, SkippedCrop};
use crate::catalog::types::Catalog;

/// Sidecar metadata for a persisted catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildMetadata {
    pub last_built: DateTime<Utc>,
    pub crop_count: usize,
    pub skipped: Vec<SkippedCrop>,
}

impl BuildMetadata {
    pub fn for_build(build: &CatalogBuild, built_at: DateTime<Utc>) -> Self {
        Self {
            last_built: built_at,
            crop_count: build.catalog.len(),
            skipped: build.skipped_crops(),
        }
    }
}

/// Sidecar path for a catalog file
pub fn metadata_path(catalog_path: &Path) -> PathBuf {
    let stem = catalog_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catalog".to_string());
    catalog_path.with_file_name(format!("{}.meta.json", stem))
}

/// Write the catalog and its sidecar metadata
///
/// Each file is staged next to its target and renamed into place, so readers see
/// either the previous document or the new one.
pub fn write_catalog(path: &Path, catalog: &Catalog, metadata: &BuildMetadata) -> Result<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create catalog directory: {:?}", parent))?;
            parent
        }
        None => Path::new("."),
    };

    let json = catalog.to_json_pretty()?;
    replace_file(dir, path, json.as_bytes())
        .with_context(|| format!("Failed to write catalog: {:?}", path))?;

    let meta_path = metadata_path(path);
    let meta_json = serde_json::to_string_pretty(metadata)
        .with_context(|| "Failed to serialize catalog metadata")?;
    replace_file(dir, &meta_path, meta_json.as_bytes())
        .with_context(|| format!("Failed to write catalog metadata: {:?}", meta_path))?;

    tracing::info!("Wrote catalog ({} crops) to {:?}", catalog.len(), path);
    Ok(())
}

fn replace_file(dir: &Path, target: &Path, contents: &[u8]) -> Result<()> {
    let mut staging = NamedTempFile::new_in(dir).context("Failed to create staging file")?;
    staging.write_all(contents).context("Failed to write staging file")?;
    staging
        .as_file()
        .sync_all()
        .context("Failed to sync staging file to disk")?;
    staging
        .persist(target)
        .map_err(|e| e.error)
        .context("Failed to move staging file into place")?;
    Ok(())
}

/// Load a persisted catalog, re-validating every plan
pub fn read_catalog(path: &Path) -> Result<Catalog> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog: {:?}", path))?;
    let catalog = Catalog::from_json_str(&contents)
        .with_context(|| format!("Failed to load catalog: {:?}", path))?;
    tracing::info!("Loaded catalog with {} crops from {:?}", catalog.len(), path);
    Ok(catalog)
}

/// Load sidecar metadata, if present
pub fn read_metadata(catalog_path: &Path) -> Result<Option<BuildMetadata>> {
    let meta_path = metadata_path(catalog_path);
    if !meta_path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read catalog metadata: {:?}", meta_path))?;
    let metadata = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse catalog metadata: {:?}", meta_path))?;
    Ok(Some(metadata))
}
