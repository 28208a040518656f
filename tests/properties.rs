//! Property-based invariant tests for filter evaluation, the rule pipeline
//! and hit testing.
//!
//! 1. A condition on a metric the region lacks never matches.
//! 2. Empty and all-disabled groups pass every region.
//! 3. Pipeline mode ignores keep/remove.
//! 4. Display-mode keep and remove are exact inverses.
//! 5. AND is true iff every enabled child is; OR iff any enabled child is.
//! 6. Running the pipeline is deterministic and leaves its input untouched.
//! 7. Re-running a single unconditional rule is idempotent.
//! 8. hit_test only returns regions containing the point, topmost first.

use proptest::prelude::*;

use segcurate::filter::{FilterAction, FilterCondition, FilterGroup, FilterLogic, evaluate};
use segcurate::geometry::point_in_polygon;
use segcurate::model::{AnnotationRegion, ClassificationMap, Point};
use segcurate::pipeline::{ClassificationRule, RuleSource, run};
use segcurate::selection::hit_test;

// ── Helpers ─────────────────────────────────────────────────────────────

const METRICS: [&str; 3] = ["Area", "Perimeter", "Circularity"];

fn region_strategy() -> impl Strategy<Value = AnnotationRegion> {
    (
        -50i64..50,
        proptest::collection::vec(proptest::option::of(0.0f64..100.0), METRICS.len()),
        proptest::option::of(1i64..4),
        any::<bool>(),
    )
        .prop_map(|(id, values, category, manual)| {
            let mut region = AnnotationRegion::new(id, Vec::new());
            for (name, value) in METRICS.iter().zip(values) {
                if let Some(value) = value {
                    region = region.with_metric(*name, value);
                }
            }
            region.category_id = category;
            region.is_manual_added = manual;
            region
        })
}

fn condition_strategy() -> impl Strategy<Value = (usize, f64, f64, bool)> {
    (0..METRICS.len(), 0.0f64..100.0, 0.0f64..100.0, any::<bool>())
}

fn group_of(
    action: FilterAction,
    logic: FilterLogic,
    conditions: &[(usize, f64, f64, bool)],
) -> FilterGroup {
    conditions
        .iter()
        .enumerate()
        .fold(FilterGroup::new(1, action, logic), |group, (i, &(m, a, b, enabled))| {
            let mut condition = FilterCondition::new(i as u64 + 2, METRICS[m], a.min(b), a.max(b));
            condition.enabled = enabled;
            group.with_child(condition)
        })
}

fn square(id: i64, x: f64, y: f64, size: f64) -> AnnotationRegion {
    AnnotationRegion::new(
        id,
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ],
    )
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Missing metric never matches
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn missing_metric_never_matches(
        region in region_strategy(),
        min in -1e6f64..1e6,
        span in 0.0f64..1e6,
        ignore_manual in any::<bool>(),
        for_pipeline in any::<bool>(),
    ) {
        let condition = FilterCondition::new(1, "NotAMetric", min, min + span);
        // Manual regions short-circuit to true in display mode
        prop_assume!(ignore_manual || !region.is_manual_added);
        prop_assert!(!evaluate(&condition, &region, ignore_manual, for_pipeline));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Empty and all-disabled groups pass
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn empty_or_disabled_groups_pass(
        region in region_strategy(),
        conditions in proptest::collection::vec(condition_strategy(), 0..6),
        remove in any::<bool>(),
        or in any::<bool>(),
        for_pipeline in any::<bool>(),
    ) {
        let action = if remove { FilterAction::Remove } else { FilterAction::Keep };
        let logic = if or { FilterLogic::Or } else { FilterLogic::And };
        let disabled: Vec<_> = conditions.iter().map(|&(m, a, b, _)| (m, a, b, false)).collect();

        let group = group_of(action, logic, &disabled);
        prop_assert!(evaluate(&group, &region, true, for_pipeline));

        let mut switched_off = group_of(action, logic, &conditions);
        switched_off.enabled = false;
        prop_assert!(evaluate(&switched_off, &region, true, for_pipeline));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3 & 4. Action polarity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pipeline_mode_ignores_action(
        region in region_strategy(),
        conditions in proptest::collection::vec(condition_strategy(), 1..6),
        or in any::<bool>(),
    ) {
        let logic = if or { FilterLogic::Or } else { FilterLogic::And };
        let keep = group_of(FilterAction::Keep, logic, &conditions);
        let remove = group_of(FilterAction::Remove, logic, &conditions);
        prop_assert_eq!(
            evaluate(&keep, &region, true, true),
            evaluate(&remove, &region, true, true)
        );
    }

    #[test]
    fn display_keep_and_remove_are_inverse(
        region in region_strategy(),
        conditions in proptest::collection::vec(condition_strategy(), 1..6),
        or in any::<bool>(),
    ) {
        prop_assume!(conditions.iter().any(|&(_, _, _, enabled)| enabled));
        let logic = if or { FilterLogic::Or } else { FilterLogic::And };
        let keep = group_of(FilterAction::Keep, logic, &conditions);
        let remove = group_of(FilterAction::Remove, logic, &conditions);

        let is_match = evaluate(&keep, &region, true, true);
        prop_assert_eq!(evaluate(&keep, &region, true, false), is_match);
        prop_assert_eq!(evaluate(&remove, &region, true, false), !is_match);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. AND/OR combination laws
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn and_or_laws(
        region in region_strategy(),
        conditions in proptest::collection::vec(condition_strategy(), 1..6),
    ) {
        prop_assume!(conditions.iter().any(|&(_, _, _, enabled)| enabled));
        let and = group_of(FilterAction::Keep, FilterLogic::And, &conditions);
        let or = group_of(FilterAction::Keep, FilterLogic::Or, &conditions);

        let active: Vec<bool> = and
            .children
            .iter()
            .filter(|child| child.enabled())
            .map(|child| evaluate(child, &region, true, true))
            .collect();

        prop_assert_eq!(evaluate(&and, &region, true, true), active.iter().all(|&r| r));
        prop_assert_eq!(evaluate(&or, &region, true, true), active.iter().any(|&r| r));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6 & 7. Pipeline determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pipeline_is_deterministic(
        regions in proptest::collection::vec(region_strategy(), 0..20),
        conditions in proptest::collection::vec(condition_strategy(), 0..4),
        seeded in proptest::collection::vec((-50i64..50, 1i64..4), 0..10),
        hops in proptest::collection::vec((proptest::option::of(1i64..4), 1i64..4), 1..5),
    ) {
        let tree = group_of(FilterAction::Keep, FilterLogic::And, &conditions);
        let rules: Vec<ClassificationRule> = hops
            .iter()
            .enumerate()
            .map(|(i, &(from, to))| {
                let from = from.map_or(RuleSource::Any, RuleSource::Category);
                ClassificationRule::from_tree(i as u64 + 1, format!("rule {i}"), from, to, &tree)
            })
            .collect();
        let input: ClassificationMap = seeded.into_iter().collect();
        let before = input.clone();

        let first = run(&rules, &regions, &input);
        let second = run(&rules, &regions, &input);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&input, &before);
    }

    #[test]
    fn unconditional_rule_is_idempotent(
        regions in proptest::collection::vec(region_strategy(), 0..20),
        to in 1i64..4,
    ) {
        let always = FilterGroup::new(1, FilterAction::Keep, FilterLogic::And);
        let rules = vec![ClassificationRule::from_tree(1, "all", RuleSource::Any, to, &always)];

        let once = run(&rules, &regions, &ClassificationMap::new());
        let twice = run(&rules, &regions, &once);
        prop_assert_eq!(&once, &twice);
        for region in &regions {
            prop_assert_eq!(once.get(region.id), Some(to));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Hit testing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hit_test_returns_topmost_container(
        squares in proptest::collection::vec((0.0f64..100.0, 0.0f64..100.0, 1.0f64..40.0), 0..12),
        x in -10.0f64..150.0,
        y in -10.0f64..150.0,
    ) {
        let regions: Vec<AnnotationRegion> = squares
            .iter()
            .enumerate()
            .map(|(i, &(sx, sy, size))| square(i as i64, sx, sy, size))
            .collect();

        let expected = regions
            .iter()
            .rev()
            .find(|r| point_in_polygon(&r.points, x, y))
            .map(|r| r.id);
        let hit = hit_test(&regions, Point::new(x, y));
        prop_assert_eq!(hit, expected);

        if let Some(id) = hit {
            let region = regions.iter().find(|r| r.id == id);
            prop_assert!(region.is_some_and(|r| r.contains(x, y)));
        }
    }
}
