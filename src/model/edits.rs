//! Operator edits layered over the automated annotations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{ClassificationMap, RegionId};

/// Manual removals and classification overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEdits {
    /// Regions the operator marked for removal.
    #[serde(default)]
    pub removed_ids: BTreeSet<RegionId>,
    /// Per-region category overrides.
    #[serde(default)]
    pub classification: ClassificationMap,
}

impl ManualEdits {
    pub fn new(removed_ids: BTreeSet<RegionId>, classification: ClassificationMap) -> Self {
        Self {
            removed_ids,
            classification,
        }
    }

    pub fn is_removed(&self, id: RegionId) -> bool {
        self.removed_ids.contains(&id)
    }

    /// Set removal membership explicitly.
    pub fn set_removed(&mut self, id: RegionId, removed: bool) {
        if removed {
            self.removed_ids.insert(id);
        } else {
            self.removed_ids.remove(&id);
        }
    }
}
