//! Data models for regions, categories and classifications.

mod category;
mod classification;
mod edits;
mod region;
mod stats;

/// Identifier of a classification category.
pub type CategoryId = i64;

pub use category::{
    CategoryDef, CategoryList, DEFAULT_CATEGORY, TRASH_CATEGORY, default_categories,
};
pub use classification::ClassificationMap;
pub use edits::ManualEdits;
pub use region::{AnnotationRegion, RegionId};
pub use stats::{MetricRange, metric_stats};

pub use crate::geometry::{BBox, Point};
