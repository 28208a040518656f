//! Recursive filter tree evaluation.

use super::tree::{FilterAction, FilterCondition, FilterGroup, FilterLogic, NodeRef};
use crate::model::{AnnotationRegion, RegionId};

/// Evaluate a filter node against one region.
///
/// * `ignore_manual_flag` - when false, manually added regions always pass.
/// * `for_pipeline` - when true, groups return their raw predicate match and
///   ignore keep/remove. When false (display mode), a `remove` group inverts
///   its match so that `false` means "hidden".
///
/// Disabled nodes, empty groups and all-disabled groups return `true`.
/// A condition whose metric the region lacks never matches.
pub fn evaluate<'a>(
    node: impl Into<NodeRef<'a>>,
    region: &AnnotationRegion,
    ignore_manual_flag: bool,
    for_pipeline: bool,
) -> bool {
    if !ignore_manual_flag && region.is_manual_added {
        return true;
    }

    match node.into() {
        NodeRef::Condition(condition) => condition_matches(condition, region),
        NodeRef::Group(group) => evaluate_group(group, region, ignore_manual_flag, for_pipeline),
    }
}

fn condition_matches(condition: &FilterCondition, region: &AnnotationRegion) -> bool {
    if !condition.enabled {
        return true;
    }
    region
        .metric(&condition.metric)
        .is_some_and(|value| condition.min <= value && value <= condition.max)
}

fn evaluate_group(
    group: &FilterGroup,
    region: &AnnotationRegion,
    ignore_manual_flag: bool,
    for_pipeline: bool,
) -> bool {
    if !group.enabled {
        return true;
    }

    let mut active = group.children.iter().filter(|child| child.enabled()).peekable();
    if active.peek().is_none() {
        return true;
    }

    let mut results = active.map(|child| evaluate(child, region, ignore_manual_flag, for_pipeline));
    let is_match = match group.logic {
        FilterLogic::And => results.all(|r| r),
        FilterLogic::Or => results.any(|r| r),
    };

    if for_pipeline {
        return is_match;
    }
    match group.action {
        FilterAction::Remove => !is_match,
        FilterAction::Keep => is_match,
    }
}

/// Ids of regions hidden by `root` in display mode, in region order.
pub fn excluded_ids(root: &FilterGroup, regions: &[AnnotationRegion]) -> Vec<RegionId> {
    regions
        .iter()
        .filter(|region| !evaluate(root, region, false, false))
        .map(|region| region.id)
        .collect()
}
