//! Plan data model
//!
//! A plan is a document-ordered mapping of farming stage → instructions, plus the two
//! scalar keys `summary` and `duration_weeks`. Field shapes are decided once, when the
//! JSON document is parsed, into the closed [`PlanField`] enum.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::error::{json_kind, PlanShapeError};

pub const SUMMARY_KEY: &str = "summary";
pub const DURATION_KEY: &str = "duration_weeks";

/// Scalar value carried through expansion untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl Scalar {
    /// Scalar view of a JSON value; `None` for arrays and objects
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Null => Some(Scalar::Null),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        Scalar::Number(Number::from(n))
    }
}

/// Shape of a plan field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    List,
    Map,
    Scalar,
}

/// One stage of a plan
///
/// `Map` values are lists or scalars; a map inside a map is rejected at parse time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanField {
    List(Vec<String>),
    Map(IndexMap<String, PlanField>),
    Scalar(Scalar),
}

impl PlanField {
    pub fn kind(&self) -> FieldKind {
        match self {
            PlanField::List(_) => FieldKind::List,
            PlanField::Map(_) => FieldKind::Map,
            PlanField::Scalar(_) => FieldKind::Scalar,
        }
    }

    /// Parse a top-level stage value
    fn from_stage_value(stage: &str, value: &Value) -> Result<Self, PlanShapeError> {
        match value {
            Value::Array(items) => Ok(PlanField::List(string_items(stage, items)?)),
            Value::Object(sub_stages) => {
                let mut map = IndexMap::with_capacity(sub_stages.len());
                for (sub_stage, sub_value) in sub_stages {
                    let field = match sub_value {
                        Value::Array(items) => {
                            let path = format!("{}.{}", stage, sub_stage);
                            PlanField::List(string_items(&path, items)?)
                        }
                        Value::Object(_) => {
                            return Err(PlanShapeError::NestedTooDeep {
                                stage: stage.to_string(),
                                sub_stage: sub_stage.clone(),
                            })
                        }
                        scalar => PlanField::Scalar(
                            Scalar::from_value(scalar).unwrap_or(Scalar::Null),
                        ),
                    };
                    map.insert(sub_stage.clone(), field);
                }
                Ok(PlanField::Map(map))
            }
            scalar => Ok(PlanField::Scalar(
                Scalar::from_value(scalar).unwrap_or(Scalar::Null),
            )),
        }
    }

    /// True when both fields have the same kind and, for maps, the same sub-stage shapes
    pub fn same_shape(&self, other: &PlanField) -> bool {
        match (self, other) {
            (PlanField::Map(a), PlanField::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(key, field)| {
                        b.get(key).is_some_and(|other_field| field.same_shape(other_field))
                    })
            }
            (a, b) => a.kind() == b.kind(),
        }
    }
}

fn string_items(stage: &str, items: &[Value]) -> Result<Vec<String>, PlanShapeError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(PlanShapeError::NonStringItem {
                stage: stage.to_string(),
                index,
                found: json_kind(other),
            }),
        })
        .collect()
}

/// Implementation plan for one crop
///
/// Serializes as a flat JSON object: `summary`, `duration_weeks`, then stages in
/// document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub summary: String,
    pub duration_weeks: Scalar,
    #[serde(flatten)]
    pub stages: IndexMap<String, PlanField>,
}

impl Plan {
    /// Parse a plan document, deciding every field's shape up front
    pub fn from_value(value: &Value) -> Result<Self, PlanShapeError> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Err(PlanShapeError::NotAnObject { found: json_kind(other) }),
        };

        let summary = match fields.get(SUMMARY_KEY) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Err(PlanShapeError::InvalidSummary { found: json_kind(other) }),
            None => return Err(PlanShapeError::MissingKey { key: SUMMARY_KEY }),
        };

        let duration_weeks = match fields.get(DURATION_KEY) {
            Some(Value::String(s)) => Scalar::Text(s.clone()),
            Some(Value::Number(n)) => Scalar::Number(n.clone()),
            Some(other) => return Err(PlanShapeError::InvalidDuration { found: json_kind(other) }),
            None => return Err(PlanShapeError::MissingKey { key: DURATION_KEY }),
        };

        let mut stages = IndexMap::with_capacity(fields.len().saturating_sub(2));
        for (stage, stage_value) in fields {
            if stage == SUMMARY_KEY || stage == DURATION_KEY {
                continue;
            }
            stages.insert(stage.clone(), PlanField::from_stage_value(stage, stage_value)?);
        }

        Ok(Plan {
            summary,
            duration_weeks,
            stages,
        })
    }

    /// True when both plans have the same stage keys and per-stage shapes
    pub fn same_shape(&self, other: &Plan) -> bool {
        self.stages.len() == other.stages.len()
            && self.stages.iter().all(|(stage, field)| {
                other.stages.get(stage).is_some_and(|other_field| field.same_shape(other_field))
            })
    }

    pub fn stage(&self, name: &str) -> Option<&PlanField> {
        self.stages.get(name)
    }
}

impl<'de> Deserialize<'de> for Plan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Plan::from_value(&value).map_err(serde::de::Error::custom)
    }
}
