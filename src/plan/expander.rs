//! Variant Expander
//!
//! Derives a strategy-specific plan from a base plan by adding one fixed line of
//! guidance to every list in the plan. Top-level lists get the variant's outer text,
//! lists one level down (sub-stages) get the shorter nested text. Scalars are never
//! touched, so the derived plan always has the base plan's shape.

use indexmap::IndexMap;

use crate::plan::types::{Plan, PlanField};
use crate::plan::variant::VariantTag;

/// Where the augmentation line goes relative to the existing instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

/// Fixed guidance added by one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Augmentation {
    pub placement: Placement,
    /// Added to top-level stage lists
    pub outer: &'static str,
    /// Added to sub-stage lists
    pub nested: &'static str,
}

pub const HIGH_YIELD: Augmentation = Augmentation {
    placement: Placement::Append,
    outer: "Use high-yielding varieties; monitor and increase N application slightly; consider foliar micronutrients",
    nested: "Increase N slightly; consider foliar micronutrient sprays",
};

pub const ORGANIC: Augmentation = Augmentation {
    placement: Placement::Prepend,
    outer: "Prefer well-decomposed compost/FYM and biofertilizers",
    nested: "Use organic inputs like compost, rock phosphate",
};

pub const LOW_INPUT: Augmentation = Augmentation {
    placement: Placement::Append,
    outer: "Adopt conservation practices: mulch, minimal tillage, low fertilizer rates",
    nested: "Reduce chemical fertilizer by ~30%; rely on legumes/rotation",
};

/// Augmentation rule for a tag; `None` for `default` and custom tags
pub fn augmentation_for(variant: &VariantTag) -> Option<&'static Augmentation> {
    match variant {
        VariantTag::HighYield => Some(&HIGH_YIELD),
        VariantTag::Organic => Some(&ORGANIC),
        VariantTag::LowInput => Some(&LOW_INPUT),
        VariantTag::Default | VariantTag::Custom(_) => None,
    }
}

/// Summary line of a derived plan, e.g. "Rice growing (High Yield variant)"
pub fn variant_summary(summary: &str, variant: &VariantTag) -> String {
    format!("{} ({} variant)", summary, variant.title())
}

/// Expand `base` into the plan for `variant`
///
/// `default` returns an identical copy. A custom tag leaves every stage unchanged but
/// still labels the summary.
pub fn expand(base: &Plan, variant: &VariantTag) -> Plan {
    if variant.is_default() {
        return base.clone();
    }

    let stages = match augmentation_for(variant) {
        Some(rule) => base
            .stages
            .iter()
            .map(|(stage, field)| (stage.clone(), augment_field(field, rule)))
            .collect(),
        None => base.stages.clone(),
    };

    Plan {
        summary: variant_summary(&base.summary, variant),
        duration_weeks: base.duration_weeks.clone(),
        stages,
    }
}

fn augment_field(field: &PlanField, rule: &Augmentation) -> PlanField {
    match field {
        PlanField::List(items) => PlanField::List(place(items, rule.outer, rule.placement)),
        PlanField::Map(sub_stages) => {
            let augmented: IndexMap<String, PlanField> = sub_stages
                .iter()
                .map(|(sub_stage, sub_field)| {
                    let sub_field = match sub_field {
                        PlanField::List(items) => {
                            PlanField::List(place(items, rule.nested, rule.placement))
                        }
                        other => other.clone(),
                    };
                    (sub_stage.clone(), sub_field)
                })
                .collect();
            PlanField::Map(augmented)
        }
        PlanField::Scalar(_) => field.clone(),
    }
}

fn place(items: &[String], line: &str, placement: Placement) -> Vec<String> {
    let mut out = Vec::with_capacity(items.len() + 1);
    match placement {
        Placement::Append => {
            out.extend_from_slice(items);
            out.push(line.to_string());
        }
        Placement::Prepend => {
            out.push(line.to_string());
            out.extend_from_slice(items);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rice() -> Plan {
        Plan::from_value(&json!({
            "summary": "Rice growing",
            "duration_weeks": 16,
            "fertilization": ["Apply urea at week 2"],
            "irrigation": {"week1": ["Flood field"]}
        }))
        .unwrap()
    }

    #[test]
    fn test_high_yield_rice_example() {
        let expanded = expand(&rice(), &VariantTag::HighYield);
        let expected = json!({
            "summary": "Rice growing (High Yield variant)",
            "duration_weeks": 16,
            "fertilization": [
                "Apply urea at week 2",
                "Use high-yielding varieties; monitor and increase N application slightly; consider foliar micronutrients"
            ],
            "irrigation": {"week1": ["Flood field", "Increase N slightly; consider foliar micronutrient sprays"]}
        });
        assert_eq!(serde_json::to_value(&expanded).unwrap(), expected);
    }

    #[test]
    fn test_organic_prepends() {
        let expanded = expand(&rice(), &VariantTag::Organic);
        assert_eq!(expanded.summary, "Rice growing (Organic variant)");
        assert_eq!(
            expanded.stage("fertilization"),
            Some(&PlanField::List(vec![
                ORGANIC.outer.to_string(),
                "Apply urea at week 2".to_string(),
            ]))
        );
        match expanded.stage("irrigation") {
            Some(PlanField::Map(sub)) => assert_eq!(
                sub.get("week1"),
                Some(&PlanField::List(vec![ORGANIC.nested.to_string(), "Flood field".to_string()]))
            ),
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_low_input_appends() {
        let expanded = expand(&rice(), &VariantTag::LowInput);
        assert_eq!(expanded.summary, "Rice growing (Low Input variant)");
        match expanded.stage("fertilization") {
            Some(PlanField::List(items)) => assert_eq!(items.last().map(|s| s.as_str()), Some(LOW_INPUT.outer)),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_default_is_identity() {
        let base = rice();
        assert_eq!(expand(&base, &VariantTag::Default), base);
    }

    #[test]
    fn test_custom_tag_only_relabels_summary() {
        let base = rice();
        let expanded = expand(&base, &VariantTag::parse("drip_irrigated"));
        assert_eq!(expanded.summary, "Rice growing (Drip Irrigated variant)");
        assert_eq!(expanded.duration_weeks, base.duration_weeks);
        assert_eq!(expanded.stages, base.stages);
    }

    #[test]
    fn test_scalars_and_non_list_sub_stages_untouched() {
        let base = Plan::from_value(&json!({
            "summary": "Maize",
            "duration_weeks": "14-16",
            "soil_type": "loam",
            "sowing": {"spacing": "60x20 cm", "steps": ["Drill seeds"]}
        }))
        .unwrap();
        let expanded = expand(&base, &VariantTag::HighYield);
        assert_eq!(expanded.stage("soil_type"), base.stage("soil_type"));
        match expanded.stage("sowing") {
            Some(PlanField::Map(sub)) => {
                assert_eq!(sub.get("spacing"), Some(&PlanField::Scalar("60x20 cm".into())));
                assert_eq!(
                    sub.get("steps"),
                    Some(&PlanField::List(vec!["Drill seeds".to_string(), HIGH_YIELD.nested.to_string()]))
                );
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_base_not_mutated() {
        let base = rice();
        let snapshot = base.clone();
        let _ = expand(&base, &VariantTag::Organic);
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_empty_list_still_augmented() {
        let base = Plan::from_value(&json!({"summary": "s", "duration_weeks": 1, "harvest": []})).unwrap();
        let expanded = expand(&base, &VariantTag::HighYield);
        assert_eq!(expanded.stage("harvest"), Some(&PlanField::List(vec![HIGH_YIELD.outer.to_string()])));
    }
}
