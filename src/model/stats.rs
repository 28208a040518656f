//! Per-metric value ranges over a region set.
//!
//! Range controls use these to seed the bounds of new filter conditions.
//! The evaluator itself never looks at them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::AnnotationRegion;

/// Observed value range of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Compute min/max per metric across `regions`. NaN values are skipped.
pub fn metric_stats(regions: &[AnnotationRegion]) -> BTreeMap<String, MetricRange> {
    let mut stats: BTreeMap<String, MetricRange> = BTreeMap::new();
    for (name, &value) in regions.iter().flat_map(|r| r.metrics.iter()) {
        if value.is_nan() {
            continue;
        }
        stats
            .entry(name.clone())
            .and_modify(|range| range.include(value))
            .or_insert(MetricRange {
                min: value,
                max: value,
            });
    }
    stats
}
