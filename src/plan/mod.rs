//! Plans and variant expansion
//!
//! - `types`: Plan / PlanField data model and parsing
//! - `variant`: Variant tags
//! - `expander`: Base plan → variant plan rules
//! - `store`: Plan Store loader

pub mod types;
pub mod variant;
pub mod expander;
pub mod store;

pub use types::{FieldKind, Plan, PlanField, Scalar};
pub use variant::VariantTag;
pub use expander::{expand, augmentation_for, Augmentation, Placement};
pub use store::PlanStore;
