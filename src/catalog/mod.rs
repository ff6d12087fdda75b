//! Plan Catalog
//!
//! - `types`: Catalog and per-crop entries
//! - `builder`: Plan Store → Catalog expansion
//! - `persist`: Catalog JSON writer/reader with sidecar build metadata
//! - `handle`: Swappable shared catalog for long-running services

pub mod types;
pub mod builder;
pub mod persist;
pub mod handle;

pub use types::{canonical_crop_key, Catalog, CropCatalogEntry, VariantList};
pub use builder::{build, build_entry, build_from_plans, CatalogBuild, SkippedCrop};
pub use persist::{read_catalog, read_metadata, write_catalog, BuildMetadata};
pub use handle::CatalogHandle;
