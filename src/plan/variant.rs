//! Variant tags
//!
//! The four farming strategies a base plan can be expanded into. Labels outside the
//! standard set are kept as [`VariantTag::Custom`] rather than rejected.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantTag {
    Default,
    HighYield,
    Organic,
    LowInput,
    Custom(String),
}

impl VariantTag {
    /// Tags every catalog entry carries, in catalog order
    pub const STANDARD: [VariantTag; 4] = [
        VariantTag::Default,
        VariantTag::HighYield,
        VariantTag::Organic,
        VariantTag::LowInput,
    ];

    pub fn parse(label: &str) -> Self {
        match label {
            "default" => VariantTag::Default,
            "high_yield" => VariantTag::HighYield,
            "organic" => VariantTag::Organic,
            "low_input" => VariantTag::LowInput,
            other => VariantTag::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VariantTag::Default => "default",
            VariantTag::HighYield => "high_yield",
            VariantTag::Organic => "organic",
            VariantTag::LowInput => "low_input",
            VariantTag::Custom(label) => label,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, VariantTag::Default)
    }

    /// Display label used in variant summaries: underscores become spaces, words are
    /// title-cased ("high_yield" → "High Yield")
    pub fn title(&self) -> String {
        let spaced = self.as_str().replace('_', " ");
        let mut titled = String::with_capacity(spaced.len());
        let mut prev_cased = false;
        for ch in spaced.chars() {
            if ch.is_alphabetic() {
                if prev_cased {
                    titled.extend(ch.to_lowercase());
                } else {
                    titled.extend(ch.to_uppercase());
                }
                prev_cased = true;
            } else {
                titled.push(ch);
                prev_cased = false;
            }
        }
        titled
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for VariantTag {
    fn from(label: &str) -> Self {
        VariantTag::parse(label)
    }
}

impl Serialize for VariantTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VariantTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(VariantTag::parse(&label))
    }
}
