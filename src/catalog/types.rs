//! Catalog data model
//!
//! The built catalog is read-only: one entry per crop, each carrying the base plan
//! under `default` plus its derived variants. A normalized name index lets predictor
//! labels that differ only in case or surrounding whitespace still find their entry.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::error::{CatalogEntryError, CatalogLookupError};
use crate::plan::{Plan, Scalar, VariantTag};

/// Variant tags of one entry, in catalog order
pub type VariantList = SmallVec<[VariantTag; 4]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropCatalogEntry {
    pub summary: String,
    pub duration_weeks: Scalar,
    pub variants: IndexMap<VariantTag, Plan>,
}

impl CropCatalogEntry {
    pub fn variant_tags(&self) -> VariantList {
        self.variants.keys().cloned().collect()
    }

    pub fn plan(&self, variant: &VariantTag) -> Option<&Plan> {
        self.variants.get(variant)
    }

    /// The unmodified base plan
    pub fn base_plan(&self) -> Option<&Plan> {
        self.variants.get(&VariantTag::Default)
    }

    /// Check the entry against what a build produces: the four standard variants in
    /// order, each shaped like `default`, with the header copied from `default`
    pub fn check(&self, crop: &str) -> Result<(), CatalogEntryError> {
        if !self.variants.keys().eq(VariantTag::STANDARD.iter()) {
            let found: Vec<&str> = self.variants.keys().map(|tag| tag.as_str()).collect();
            return Err(CatalogEntryError::NonStandardVariants {
                crop: crop.to_string(),
                found: found.join(", "),
            });
        }

        let Some(base) = self.base_plan() else {
            return Err(CatalogEntryError::NonStandardVariants {
                crop: crop.to_string(),
                found: String::new(),
            });
        };
        if base.summary != self.summary || base.duration_weeks != self.duration_weeks {
            return Err(CatalogEntryError::HeaderMismatch { crop: crop.to_string() });
        }
        if let Some((tag, _)) = self.variants.iter().find(|(_, plan)| !plan.same_shape(base)) {
            return Err(CatalogEntryError::ShapeMismatch {
                crop: crop.to_string(),
                variant: tag.to_string(),
            });
        }
        Ok(())
    }
}

/// Lookup key for crop names: trimmed and lowercased
pub fn canonical_crop_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: IndexMap<String, CropCatalogEntry>,
    /// canonical key → crop name as stored
    lookup: FxHashMap<String, String>,
}

impl Catalog {
    pub fn from_entries(entries: IndexMap<String, CropCatalogEntry>) -> Self {
        let mut lookup = FxHashMap::default();
        for crop in entries.keys() {
            // First spelling wins on collisions; exact matches are checked before this index.
            lookup
                .entry(canonical_crop_key(crop))
                .or_insert_with(|| crop.clone());
        }
        Self { entries, lookup }
    }

    pub fn entries(&self) -> &IndexMap<String, CropCatalogEntry> {
        &self.entries
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

    /// Find the entry for a crop label: exact match first, then the normalized index
    pub fn resolve(&self, label: &str) -> Option<(&str, &CropCatalogEntry)> {
        if let Some((crop, entry)) = self.entries.get_key_value(label) {
            return Some((crop.as_str(), entry));
        }
        let crop = self.lookup.get(&canonical_crop_key(label))?;
        self.entries
            .get_key_value(crop)
            .map(|(crop, entry)| (crop.as_str(), entry))
    }

    pub fn entry(&self, crop: &str) -> Result<&CropCatalogEntry, CatalogLookupError> {
        self.resolve(crop)
            .map(|(_, entry)| entry)
            .ok_or_else(|| CatalogLookupError::UnknownCrop { crop: crop.to_string() })
    }

    pub fn plan(&self, crop: &str, variant: &VariantTag) -> Result<&Plan, CatalogLookupError> {
        self.entry(crop)?
            .plan(variant)
            .ok_or_else(|| CatalogLookupError::UnknownVariant {
                crop: crop.to_string(),
                variant: variant.to_string(),
            })
    }

    /// Pretty JSON in the persisted catalog schema (two-space indent)
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).with_context(|| "Failed to serialize catalog")
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).with_context(|| "Failed to parse catalog JSON")
    }
}

impl PartialEq for Catalog {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = IndexMap::<String, CropCatalogEntry>::deserialize(deserializer)?;
        for (crop, entry) in &entries {
            entry.check(crop).map_err(serde::de::Error::custom)?;
        }
        Ok(Catalog::from_entries(entries))
    }
}
