//! Ordered classification rules.
//!
//! Rules run in list order. Each rule first scans every region against the
//! classification as it stood when the rule started, then assigns its target
//! category to all matches at once. The next rule sees those assignments.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CurateError, Result};
use crate::filter::{FilterGroup, evaluate};
use crate::model::{AnnotationRegion, CategoryId, ClassificationMap, RegionId};

/// Identifier of a classification rule.
pub type RuleId = u64;

/// Which regions a rule considers, by their current category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSource {
    /// Every region regardless of category.
    #[default]
    Any,
    /// Only regions currently in this category.
    Category(CategoryId),
}

impl RuleSource {
    #[inline]
    pub fn accepts(&self, category: CategoryId) -> bool {
        match self {
            RuleSource::Any => true,
            RuleSource::Category(id) => *id == category,
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::Any => f.write_str("any"),
            RuleSource::Category(id) => write!(f, "{id}"),
        }
    }
}

impl Serialize for RuleSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RuleSource::Any => serializer.serialize_str("any"),
            RuleSource::Category(id) => serializer.serialize_i64(*id),
        }
    }
}

impl<'de> Deserialize<'de> for RuleSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Id(CategoryId),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Id(id) => Ok(RuleSource::Category(id)),
            Repr::Text(text) if text == "any" => Ok(RuleSource::Any),
            Repr::Text(text) => text
                .parse()
                .map(RuleSource::Category)
                .map_err(|_| de::Error::custom(format!("invalid fromClass '{text}'"))),
        }
    }
}

/// A reusable reclassification rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRule {
    pub id: RuleId,
    pub name: String,
    pub enabled: bool,
    pub from_class: RuleSource,
    pub to_class: CategoryId,
    /// Snapshot of the filter tree taken when the rule was created.
    pub filter: FilterGroup,
}

impl ClassificationRule {
    /// Create a rule from the live editor tree.
    ///
    /// The tree is deep-copied so later edits to the editor never reach the rule.
    pub fn from_tree(
        id: RuleId,
        name: impl Into<String>,
        from_class: RuleSource,
        to_class: CategoryId,
        tree: &FilterGroup,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
            from_class,
            to_class,
            filter: tree.clone(),
        }
    }

    /// Regions this rule would reassign, given the classification at rule start.
    pub fn targets(
        &self,
        regions: &[AnnotationRegion],
        classification: &ClassificationMap,
    ) -> Vec<RegionId> {
        regions
            .iter()
            .filter(|region| {
                self.from_class
                    .accepts(classification.effective_category(region))
            })
            .filter(|region| evaluate(&self.filter, region, true, true))
            .map(|region| region.id)
            .collect()
    }
}

/// Number of regions one rule reassigned during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule_id: RuleId,
    pub targets: usize,
}

/// Run every enabled rule in order and return the resulting classification.
///
/// The input map is left untouched. Manually added regions are not exempt.
pub fn run(
    rules: &[ClassificationRule],
    regions: &[AnnotationRegion],
    classification: &ClassificationMap,
) -> ClassificationMap {
    run_with_report(rules, regions, classification).0
}

/// Like [`run`], also reporting how many regions each enabled rule hit.
pub fn run_with_report(
    rules: &[ClassificationRule],
    regions: &[AnnotationRegion],
    classification: &ClassificationMap,
) -> (ClassificationMap, Vec<RuleOutcome>) {
    let mut working = classification.clone();
    let mut outcomes = Vec::new();

    for rule in rules.iter().filter(|r| r.enabled) {
        let targets = rule.targets(regions, &working);
        log::debug!(
            "⚙️ Rule '{}' ({} -> {}): {} targets",
            rule.name,
            rule.from_class,
            rule.to_class,
            targets.len()
        );
        for &id in &targets {
            working.set(id, rule.to_class);
        }
        outcomes.push(RuleOutcome {
            rule_id: rule.id,
            targets: targets.len(),
        });
    }

    log::info!(
        "✅ Ran {} classification rules over {} regions",
        outcomes.len(),
        regions.len()
    );
    (working, outcomes)
}

/// Ordered rule list. List order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleList(Vec<ClassificationRule>);

impl RuleList {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self(rules)
    }

    pub fn as_slice(&self) -> &[ClassificationRule] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: RuleId) -> Option<&ClassificationRule> {
        self.0.iter().find(|r| r.id == id)
    }

    /// Smallest id greater than every existing rule id.
    pub fn next_id(&self) -> RuleId {
        self.0.iter().map(|r| r.id).max().map_or(1, |id| id + 1)
    }

    /// Snapshot `tree` into a new enabled rule appended at the end.
    pub fn create(
        &mut self,
        name: impl Into<String>,
        from_class: RuleSource,
        to_class: CategoryId,
        tree: &FilterGroup,
    ) -> RuleId {
        let id = self.next_id();
        let rule = ClassificationRule::from_tree(id, name, from_class, to_class, tree);
        log::debug!("➕ Created rule '{}' (id={})", rule.name, id);
        self.0.push(rule);
        id
    }

    pub fn remove(&mut self, id: RuleId) -> Result<ClassificationRule> {
        let index = self.position(id)?;
        Ok(self.0.remove(index))
    }

    /// Flip a rule's enabled flag, returning the new value.
    pub fn toggle(&mut self, id: RuleId) -> Result<bool> {
        let index = self.position(id)?;
        let rule = &mut self.0[index];
        rule.enabled = !rule.enabled;
        Ok(rule.enabled)
    }

    /// Swap a rule with its predecessor. No-op for the first rule.
    pub fn move_up(&mut self, id: RuleId) -> Result<()> {
        let index = self.position(id)?;
        if index > 0 {
            self.0.swap(index - 1, index);
        }
        Ok(())
    }

    /// Swap a rule with its successor. No-op for the last rule.
    pub fn move_down(&mut self, id: RuleId) -> Result<()> {
        let index = self.position(id)?;
        if index + 1 < self.0.len() {
            self.0.swap(index, index + 1);
        }
        Ok(())
    }

    /// Run the enabled rules of this list. See [`run`].
    pub fn run(
        &self,
        regions: &[AnnotationRegion],
        classification: &ClassificationMap,
    ) -> ClassificationMap {
        run(&self.0, regions, classification)
    }

    fn position(&self, id: RuleId) -> Result<usize> {
        self.0
            .iter()
            .position(|r| r.id == id)
            .ok_or(CurateError::RuleNotFound { id })
    }
}
