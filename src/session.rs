//! Curation session: one dataset's regions plus the operator's state.
//!
//! The session keeps the derived exclusion cache in sync with the filter
//! tree and records every manual edit in the undo history.

use crate::error::Result;
use crate::filter::{FilterConfig, FilterNode, NodeId, NodeUpdate};
use crate::model::{AnnotationRegion, CategoryId, CategoryList, ManualEdits, Point, RegionId};
use crate::pipeline::{RuleId, RuleList, RuleOutcome, RuleSource, run_with_report};
use crate::selection::{Selection, ToggleMode, toggle_regions};
use crate::store::CurationState;
use crate::undo::{self, Command, UndoConfig, UndoStack};

/// Counts reported back to the operator after a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionFeedback {
    pub added: usize,
    pub removed: usize,
}

/// In-memory state of one curation session.
#[derive(Debug, Clone)]
pub struct CurationSession {
    regions: Vec<AnnotationRegion>,
    filter: FilterConfig,
    rules: RuleList,
    categories: CategoryList,
    edits: ManualEdits,
    history: UndoStack,
}

impl CurationSession {
    /// Start a session over `regions` with previously saved state.
    pub fn new(regions: Vec<AnnotationRegion>, state: CurationState) -> Self {
        Self::with_history(regions, state, UndoConfig::default())
    }

    /// Start a session with a custom undo history size.
    pub fn with_history(
        regions: Vec<AnnotationRegion>,
        state: CurationState,
        config: UndoConfig,
    ) -> Self {
        let mut session = Self {
            regions,
            filter: state.filter,
            rules: state.rules,
            categories: state.categories,
            edits: state.edits,
            history: UndoStack::with_config(config),
        };
        session.refresh_excluded();
        log::info!(
            "Session started with {} regions, {} rules",
            session.regions.len(),
            session.rules.len()
        );
        session
    }

    pub fn regions(&self) -> &[AnnotationRegion] {
        &self.regions
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn rules(&self) -> &RuleList {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleList {
        &mut self.rules
    }

    pub fn categories(&self) -> &CategoryList {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut CategoryList {
        &mut self.categories
    }

    pub fn edits(&self) -> &ManualEdits {
        &self.edits
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Snapshot of the persistable state.
    pub fn state(&self) -> CurationState {
        CurationState {
            filter: self.filter.clone(),
            rules: self.rules.clone(),
            categories: self.categories.clone(),
            edits: self.edits.clone(),
        }
    }

    /// Effective category of a region, if the region exists.
    pub fn category_of(&self, id: RegionId) -> Option<CategoryId> {
        self.regions
            .iter()
            .find(|r| r.id == id)
            .map(|r| self.edits.classification.effective_category(r))
    }

    /// Regions neither hidden by the filter nor manually removed.
    pub fn visible_regions(&self) -> impl Iterator<Item = &AnnotationRegion> + '_ {
        self.regions.iter().filter(|r| {
            !self.filter.excluded_ids.contains(&r.id) && !self.edits.is_removed(r.id)
        })
    }

    /// Add a hand-drawn region with a fresh negative id.
    pub fn add_manual_region(&mut self, points: Vec<Point>, category: CategoryId) -> RegionId {
        let id = self.regions.iter().map(|r| r.id).min().unwrap_or(0).min(0) - 1;
        self.regions.push(AnnotationRegion::manual(id, points, category));
        log::info!("✅ Added manual region {} (category={})", id, category);
        self.refresh_excluded();
        id
    }

    /// Replace the whole filter configuration.
    pub fn set_filter(&mut self, filter: FilterConfig) {
        self.filter = filter;
        self.refresh_excluded();
    }

    pub fn update_filter_node(&mut self, id: NodeId, update: &NodeUpdate) -> Result<()> {
        self.filter.update_node(id, update)?;
        self.refresh_excluded();
        Ok(())
    }

    pub fn add_filter_node(&mut self, parent_id: NodeId, child: FilterNode) -> Result<()> {
        self.filter.add_child(parent_id, child)?;
        self.refresh_excluded();
        Ok(())
    }

    pub fn remove_filter_node(&mut self, id: NodeId) -> Result<()> {
        self.filter.remove_node(id)?;
        self.refresh_excluded();
        Ok(())
    }

    /// Snapshot the live filter tree into a new rule.
    pub fn create_rule_from_filter(
        &mut self,
        name: impl Into<String>,
        from_class: RuleSource,
        to_class: CategoryId,
    ) -> RuleId {
        self.rules.create(name, from_class, to_class, &self.filter.root)
    }

    /// Run the enabled rules and adopt the resulting classification.
    ///
    /// The run is recorded as one undo step when it changed anything.
    pub fn run_rules(&mut self) -> Vec<RuleOutcome> {
        let (next, outcomes) = run_with_report(
            self.rules.as_slice(),
            &self.regions,
            &self.edits.classification,
        );
        if next != self.edits.classification {
            let old = std::mem::replace(&mut self.edits.classification, next.clone());
            self.history.push(Command::ReplaceClassification { old, new: next });
        }
        outcomes
    }

    /// Apply a finished pointer gesture.
    pub fn apply_selection(
        &mut self,
        mode: ToggleMode,
        selection: &Selection,
    ) -> SelectionFeedback {
        let outcome = toggle_regions(&self.edits, mode, selection.ids());
        if let Some(command) = outcome.command {
            self.history.push(command);
        }
        self.edits = outcome.edits;
        SelectionFeedback {
            added: outcome.added,
            removed: outcome.removed,
        }
    }

    pub fn undo(&mut self) -> bool {
        undo::undo_command(&mut self.history, &mut self.edits)
    }

    pub fn redo(&mut self) -> bool {
        undo::redo_command(&mut self.history, &mut self.edits)
    }

    fn refresh_excluded(&mut self) {
        self.filter.refresh_excluded(&self.regions);
    }
}
