//! Filter tree model and pure structural edits.
//!
//! Edits never mutate a tree in place. Each returns a rebuilt tree so callers
//! can keep the previous value for diffing or undo, and so rule snapshots
//! never alias the tree being edited.

use serde::{Deserialize, Serialize};

/// Identifier of a node, unique within one tree.
pub type NodeId = u64;

/// How a group's combined match is interpreted in display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterAction {
    /// Matching regions stay visible.
    #[default]
    Keep,
    /// Matching regions are hidden.
    Remove,
}

/// How a group combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterLogic {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

fn default_enabled() -> bool {
    true
}

/// Leaf predicate: value of `metric` lies within `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub id: NodeId,
    pub metric: String,
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl FilterCondition {
    pub fn new(id: NodeId, metric: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            id,
            metric: metric.into(),
            min,
            max,
            enabled: true,
        }
    }
}

/// Branch node combining children with AND/OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub id: NodeId,
    pub action: FilterAction,
    pub logic: FilterLogic,
    pub children: Vec<FilterNode>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A node of the filter tree.
///
/// Serialized untagged: an object with a `children` array is a group,
/// anything else is a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group(FilterGroup),
    Condition(FilterCondition),
}

/// Borrowed view of either node kind, including a bare root group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Group(&'a FilterGroup),
    Condition(&'a FilterCondition),
}

impl<'a> From<&'a FilterNode> for NodeRef<'a> {
    fn from(node: &'a FilterNode) -> Self {
        match node {
            FilterNode::Group(g) => NodeRef::Group(g),
            FilterNode::Condition(c) => NodeRef::Condition(c),
        }
    }
}

impl<'a> From<&'a FilterGroup> for NodeRef<'a> {
    fn from(group: &'a FilterGroup) -> Self {
        NodeRef::Group(group)
    }
}

impl<'a> From<&'a FilterCondition> for NodeRef<'a> {
    fn from(condition: &'a FilterCondition) -> Self {
        NodeRef::Condition(condition)
    }
}

impl NodeRef<'_> {
    pub fn id(&self) -> NodeId {
        match self {
            NodeRef::Group(g) => g.id,
            NodeRef::Condition(c) => c.id,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            NodeRef::Group(g) => g.enabled,
            NodeRef::Condition(c) => c.enabled,
        }
    }
}

impl FilterNode {
    pub fn id(&self) -> NodeId {
        NodeRef::from(self).id()
    }

    pub fn enabled(&self) -> bool {
        NodeRef::from(self).enabled()
    }

    pub fn as_group(&self) -> Option<&FilterGroup> {
        match self {
            FilterNode::Group(g) => Some(g),
            FilterNode::Condition(_) => None,
        }
    }
}

impl From<FilterGroup> for FilterNode {
    fn from(group: FilterGroup) -> Self {
        FilterNode::Group(group)
    }
}

impl From<FilterCondition> for FilterNode {
    fn from(condition: FilterCondition) -> Self {
        FilterNode::Condition(condition)
    }
}

/// Partial update applied to a node by id.
///
/// Fields that don't apply to the target node kind are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub enabled: Option<bool>,
    pub action: Option<FilterAction>,
    pub logic: Option<FilterLogic>,
    pub metric: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NodeUpdate {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    fn apply_group(&self, group: &mut FilterGroup) {
        if let Some(enabled) = self.enabled {
            group.enabled = enabled;
        }
        if let Some(action) = self.action {
            group.action = action;
        }
        if let Some(logic) = self.logic {
            group.logic = logic;
        }
    }

    fn apply_condition(&self, condition: &mut FilterCondition) {
        if let Some(enabled) = self.enabled {
            condition.enabled = enabled;
        }
        if let Some(metric) = &self.metric {
            condition.metric.clone_from(metric);
        }
        if let Some(min) = self.min {
            condition.min = min;
        }
        if let Some(max) = self.max {
            condition.max = max;
        }
    }
}

impl FilterGroup {
    /// Create an empty, enabled group.
    pub fn new(id: NodeId, action: FilterAction, logic: FilterLogic) -> Self {
        Self {
            id,
            action,
            logic,
            children: Vec::new(),
            enabled: true,
        }
    }

    /// Builder-style child append (does not check id uniqueness).
    pub fn with_child(mut self, child: impl Into<FilterNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Find a node anywhere in the tree, including this group itself.
    pub fn find(&self, id: NodeId) -> Option<NodeRef<'_>> {
        if self.id == id {
            return Some(NodeRef::Group(self));
        }
        self.children.iter().find_map(|child| match child {
            FilterNode::Group(g) => g.find(id),
            FilterNode::Condition(c) => (c.id == id).then_some(NodeRef::Condition(c)),
        })
    }

    /// Every node id in the tree, in pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = vec![self.id];
        for child in &self.children {
            match child {
                FilterNode::Group(g) => ids.extend(g.ids()),
                FilterNode::Condition(c) => ids.push(c.id),
            }
        }
        ids
    }

    /// Smallest id greater than every id in the tree.
    pub fn next_id(&self) -> NodeId {
        self.ids().into_iter().max().map_or(1, |id| id + 1)
    }

    /// Number of group levels, counting this group as 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .filter_map(FilterNode::as_group)
            .map(FilterGroup::depth)
            .max()
            .unwrap_or(0)
    }

    /// Depth at which the group `id` sits (root = 1), if it is a group.
    pub fn group_level(&self, id: NodeId) -> Option<usize> {
        if self.id == id {
            return Some(1);
        }
        self.children
            .iter()
            .filter_map(FilterNode::as_group)
            .find_map(|g| g.group_level(id))
            .map(|level| level + 1)
    }

    /// Return a copy with `update` applied to node `id`. Unknown ids leave the tree unchanged.
    pub fn with_update(&self, id: NodeId, update: &NodeUpdate) -> FilterGroup {
        let mut group = self.clone();
        if group.id == id {
            update.apply_group(&mut group);
            return group;
        }
        group.children = group
            .children
            .into_iter()
            .map(|child| match child {
                FilterNode::Group(g) => FilterNode::Group(g.with_update(id, update)),
                FilterNode::Condition(mut c) => {
                    if c.id == id {
                        update.apply_condition(&mut c);
                    }
                    FilterNode::Condition(c)
                }
            })
            .collect();
        group
    }

    /// Return a copy without node `id` and its subtree. The root itself cannot be removed.
    pub fn without_node(&self, id: NodeId) -> FilterGroup {
        let mut group = self.clone();
        group.children = group
            .children
            .into_iter()
            .filter(|child| child.id() != id)
            .map(|child| match child {
                FilterNode::Group(g) => FilterNode::Group(g.without_node(id)),
                other => other,
            })
            .collect();
        group
    }

    /// Return a copy with `child` appended to group `parent_id`.
    ///
    /// If `parent_id` is missing or names a condition the tree is unchanged.
    pub fn with_child_added(&self, parent_id: NodeId, child: FilterNode) -> FilterGroup {
        let mut group = self.clone();
        if group.id == parent_id {
            group.children.push(child);
            return group;
        }
        group.children = group
            .children
            .into_iter()
            .map(|existing| match existing {
                FilterNode::Group(g) => {
                    FilterNode::Group(g.with_child_added(parent_id, child.clone()))
                }
                other => other,
            })
            .collect();
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root(1, AND keep) [ cond(2), group(3, OR remove) [ cond(4), cond(5) ] ]
    fn sample_tree() -> FilterGroup {
        FilterGroup::new(1, FilterAction::Keep, FilterLogic::And)
            .with_child(FilterCondition::new(2, "Area", 0.0, 100.0))
            .with_child(
                FilterGroup::new(3, FilterAction::Remove, FilterLogic::Or)
                    .with_child(FilterCondition::new(4, "Solidity", 0.0, 0.5))
                    .with_child(FilterCondition::new(5, "Circularity", 0.0, 0.3)),
            )
    }

    #[test]
    fn test_find_and_ids() {
        let tree = sample_tree();
        assert_eq!(tree.ids(), vec![1, 2, 3, 4, 5]);
        assert_eq!(tree.next_id(), 6);
        assert!(matches!(tree.find(4), Some(NodeRef::Condition(c)) if c.metric == "Solidity"));
        assert!(matches!(tree.find(3), Some(NodeRef::Group(_))));
        assert!(tree.find(42).is_none());
    }

    #[test]
    fn test_depth() {
        let tree = sample_tree();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.group_level(1), Some(1));
        assert_eq!(tree.group_level(3), Some(2));
        assert_eq!(tree.group_level(4), None);
        assert_eq!(FilterGroup::new(1, FilterAction::Keep, FilterLogic::And).depth(), 1);
    }

    #[test]
    fn test_update_does_not_mutate_input() {
        let tree = sample_tree();
        let updated = tree.with_update(4, &NodeUpdate::range(0.1, 0.2));

        let Some(NodeRef::Condition(original)) = tree.find(4) else {
            panic!("Expected condition 4");
        };
        assert_eq!((original.min, original.max), (0.0, 0.5));

        let Some(NodeRef::Condition(changed)) = updated.find(4) else {
            panic!("Expected condition 4");
        };
        assert_eq!((changed.min, changed.max), (0.1, 0.2));
    }

    #[test]
    fn test_update_group_fields() {
        let update = NodeUpdate {
            action: Some(FilterAction::Keep),
            logic: Some(FilterLogic::And),
            ..NodeUpdate::default()
        };
        let updated = sample_tree().with_update(3, &update);
        let Some(NodeRef::Group(g)) = updated.find(3) else {
            panic!("Expected group 3");
        };
        assert_eq!(g.action, FilterAction::Keep);
        assert_eq!(g.logic, FilterLogic::And);
    }

    #[test]
    fn test_remove_subtree() {
        let tree = sample_tree();
        let pruned = tree.without_node(3);
        assert_eq!(pruned.ids(), vec![1, 2]);
        assert_eq!(tree.ids(), vec![1, 2, 3, 4, 5]);

        // Root is never removed
        assert_eq!(tree.without_node(1), tree);
    }

    #[test]
    fn test_add_child() {
        let tree = sample_tree();
        let added = tree.with_child_added(3, FilterCondition::new(6, "Area", 5.0, 9.0).into());
        assert_eq!(added.ids(), vec![1, 2, 3, 4, 5, 6]);

        // Conditions can't hold children
        assert_eq!(
            tree.with_child_added(2, FilterCondition::new(6, "Area", 5.0, 9.0).into()),
            tree
        );
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample_tree()).expect("serialize tree");
        assert_eq!(json["action"], "keep");
        assert_eq!(json["logic"], "AND");
        assert_eq!(json["children"][1]["logic"], "OR");
        assert_eq!(json["children"][0]["metric"], "Area");

        let parsed: FilterGroup = serde_json::from_value(json).expect("parse tree");
        assert_eq!(parsed, sample_tree());
    }

    #[test]
    fn test_condition_json_without_enabled_defaults_to_enabled() {
        let node: FilterNode =
            serde_json::from_str(r#"{"id": 9, "metric": "Area", "min": 1, "max": 2}"#)
                .expect("parse condition");
        assert!(matches!(node, FilterNode::Condition(ref c) if c.enabled));
    }
}
