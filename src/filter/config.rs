//! Persisted filter configuration with a version gate.

use serde::{Deserialize, Serialize};

use super::evaluate::excluded_ids;
use super::tree::{FilterAction, FilterGroup, FilterLogic, FilterNode, NodeId, NodeUpdate};
use crate::error::{CurateError, Result};
use crate::model::{AnnotationRegion, RegionId};

/// Current filter configuration format version.
/// Files with any other version are treated as absent.
pub const FILTER_CONFIG_VERSION: u32 = 3;

/// Default maximum group nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Id of the root group in a fresh configuration.
pub const ROOT_NODE_ID: NodeId = 1;

/// Filter tree plus its derived exclusion cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Format version, always [`FILTER_CONFIG_VERSION`] once loaded.
    pub version: u32,
    /// Root group of the filter tree.
    pub root: FilterGroup,
    /// Maximum group nesting depth allowed by edits.
    pub max_depth: usize,
    /// Regions hidden by `root` in display mode.
    ///
    /// Derived cache only: recomputed by [`FilterConfig::refresh_excluded`],
    /// never edited by hand.
    #[serde(default)]
    pub excluded_ids: Vec<RegionId>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            version: FILTER_CONFIG_VERSION,
            root: FilterGroup::new(ROOT_NODE_ID, FilterAction::Keep, FilterLogic::And),
            max_depth: DEFAULT_MAX_DEPTH,
            excluded_ids: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a configuration.
    ///
    /// Malformed JSON is an error. A well-formed document whose `version` is
    /// missing or not [`FILTER_CONFIG_VERSION`] yields the default config.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let version = value.get("version").and_then(serde_json::Value::as_u64);
        if version != Some(u64::from(FILTER_CONFIG_VERSION)) {
            log::warn!(
                "Filter config version {:?} is not {}, starting from an empty filter",
                version,
                FILTER_CONFIG_VERSION
            );
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Recompute the exclusion cache from the current tree.
    pub fn refresh_excluded(&mut self, regions: &[AnnotationRegion]) {
        self.excluded_ids = excluded_ids(&self.root, regions);
        log::debug!(
            "🔍 Filter hides {} of {} regions",
            self.excluded_ids.len(),
            regions.len()
        );
    }

    /// Replace the tree with a copy where node `id` has `update` applied.
    pub fn update_node(&mut self, id: NodeId, update: &NodeUpdate) -> Result<()> {
        self.require(id)?;
        self.root = self.root.with_update(id, update);
        Ok(())
    }

    /// Remove node `id` and its subtree. Removing the root is a no-op.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        self.require(id)?;
        self.root = self.root.without_node(id);
        Ok(())
    }

    /// Append `child` to group `parent_id`.
    ///
    /// Fails if the parent is missing or a condition, if any id in `child`
    /// is already used, or if the tree would nest deeper than `max_depth`.
    pub fn add_child(&mut self, parent_id: NodeId, child: FilterNode) -> Result<()> {
        let level = match self.root.find(parent_id) {
            None => return Err(CurateError::NodeNotFound { id: parent_id }),
            Some(_) => self
                .root
                .group_level(parent_id)
                .ok_or(CurateError::NotAGroup { id: parent_id })?,
        };

        let existing = self.root.ids();
        let incoming = match &child {
            FilterNode::Group(g) => g.ids(),
            FilterNode::Condition(c) => vec![c.id],
        };
        if let Some(&id) = incoming.iter().find(|id| existing.contains(id)) {
            return Err(CurateError::DuplicateNode { id });
        }

        if let FilterNode::Group(g) = &child {
            let depth = level + g.depth();
            if depth > self.max_depth {
                return Err(CurateError::DepthExceeded {
                    depth,
                    max_depth: self.max_depth,
                });
            }
        }

        self.root = self.root.with_child_added(parent_id, child);
        Ok(())
    }

    /// Next free node id in this tree.
    pub fn next_id(&self) -> NodeId {
        self.root.next_id()
    }

    fn require(&self, id: NodeId) -> Result<()> {
        self.root
            .find(id)
            .map(|_| ())
            .ok_or(CurateError::NodeNotFound { id })
    }
}
