//! Region to category assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AnnotationRegion, CategoryId, RegionId};

/// Per-region category overrides.
///
/// Only regions whose effective category differs from their default carry an
/// entry. Serialized as a JSON object keyed by the region id as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationMap(BTreeMap<RegionId, CategoryId>);

impl ClassificationMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, id: RegionId) -> Option<CategoryId> {
        self.0.get(&id).copied()
    }

    /// Assign a category, returning the previous entry.
    pub fn set(&mut self, id: RegionId, category: CategoryId) -> Option<CategoryId> {
        self.0.insert(id, category)
    }

    /// Drop the entry for a region, returning it.
    pub fn unset(&mut self, id: RegionId) -> Option<CategoryId> {
        self.0.remove(&id)
    }

    /// Restore an entry to an exact previous state (`None` removes it).
    pub fn restore(&mut self, id: RegionId, category: Option<CategoryId>) {
        match category {
            Some(category) => {
                self.0.insert(id, category);
            }
            None => {
                self.0.remove(&id);
            }
        }
    }

    /// Effective category: explicit entry, else the region's own category, else 1.
    #[inline]
    pub fn effective_category(&self, region: &AnnotationRegion) -> CategoryId {
        self.get(region.id).unwrap_or_else(|| region.default_category())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, CategoryId)> + '_ {
        self.0.iter().map(|(&id, &cat)| (id, cat))
    }
}

impl FromIterator<(RegionId, CategoryId)> for ClassificationMap {
    fn from_iter<I: IntoIterator<Item = (RegionId, CategoryId)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
