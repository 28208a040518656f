//! Annotation region data model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::category::DEFAULT_CATEGORY;
use super::CategoryId;
use crate::geometry::{self, BBox, Point};

/// Unique identifier for a region within a dataset.
///
/// Manually added regions use negative ids so they never collide with ids
/// produced by the segmentation model.
pub type RegionId = i64;

/// One segmented annotation object: polygon, bounding box and metrics.
///
/// A region loaded without a `bbox` gets one derived from its points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RegionFile")]
pub struct AnnotationRegion {
    /// Unique identifier.
    pub id: RegionId,
    /// Bounding box as `[x, y, width, height]`.
    pub bbox: BBox,
    /// Closed polygon outline; the first point is not repeated.
    #[serde(default)]
    pub points: Vec<Point>,
    /// Numeric attributes keyed by metric name (e.g. `Area`).
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
    /// Category assigned by the producer of the region, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Whether the operator added this region by hand.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_manual_added: bool,
}

/// On-disk shape of a region, where `bbox` may be omitted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionFile {
    id: RegionId,
    #[serde(default)]
    bbox: Option<BBox>,
    #[serde(default)]
    points: Vec<Point>,
    #[serde(default)]
    metrics: HashMap<String, f64>,
    #[serde(default)]
    category_id: Option<CategoryId>,
    #[serde(default)]
    is_manual_added: bool,
}

impl From<RegionFile> for AnnotationRegion {
    fn from(file: RegionFile) -> Self {
        Self {
            id: file.id,
            bbox: file.bbox.unwrap_or_else(|| geometry::bounding_box(&file.points)),
            points: file.points,
            metrics: file.metrics,
            category_id: file.category_id,
            is_manual_added: file.is_manual_added,
        }
    }
}

impl AnnotationRegion {
    /// Create a region from its outline, deriving the bounding box.
    pub fn new(id: RegionId, points: Vec<Point>) -> Self {
        Self {
            id,
            bbox: geometry::bounding_box(&points),
            points,
            metrics: HashMap::new(),
            category_id: None,
            is_manual_added: false,
        }
    }

    /// Create a manually added region.
    pub fn manual(id: RegionId, points: Vec<Point>, category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            is_manual_added: true,
            ..Self::new(id, points)
        }
    }

    /// Add a metric value.
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    /// Set the producer-assigned category.
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Look up a metric value.
    #[inline]
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Category used when the classification map has no entry for this region.
    #[inline]
    pub fn default_category(&self) -> CategoryId {
        self.category_id.unwrap_or(DEFAULT_CATEGORY)
    }

    /// Check if a canvas point is inside the region outline.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        geometry::point_in_polygon(&self.points, x, y)
    }
}
