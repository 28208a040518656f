//! Undo/Redo system for manual curation edits.
//!
//! Each undoable action is represented as a Command that stores enough
//! information to reverse its effect on the [`ManualEdits`] state.

use crate::model::{CategoryId, ClassificationMap, ManualEdits, RegionId};

// ============================================================================
// Command Types
// ============================================================================

/// A command that can be undone and redone.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Change a region's classification entry
    SetCategory {
        /// The region ID
        region_id: RegionId,
        /// Entry before the change (`None` = no override)
        old: Option<CategoryId>,
        /// Entry after the change (`None` = no override)
        new: Option<CategoryId>,
    },
    /// Change a region's removal membership
    SetRemoved {
        /// The region ID
        region_id: RegionId,
        /// Membership after the change
        removed: bool,
    },
    /// Replace the whole classification map (e.g. after a pipeline run)
    ReplaceClassification {
        /// Map before the replacement
        old: ClassificationMap,
        /// Map after the replacement
        new: ClassificationMap,
    },
    /// Batch command - groups multiple commands into one undo step
    Batch {
        /// Description of the batch operation
        description: String,
        /// The commands in this batch
        commands: Vec<Command>,
    },
}

impl Command {
    /// Get a human-readable description of this command
    pub fn description(&self) -> String {
        match self {
            Command::SetCategory { new: Some(_), .. } => "Classify region".to_string(),
            Command::SetCategory { new: None, .. } => "Unclassify region".to_string(),
            Command::SetRemoved { removed: true, .. } => "Remove region".to_string(),
            Command::SetRemoved { removed: false, .. } => "Restore region".to_string(),
            Command::ReplaceClassification { .. } => "Run classification rules".to_string(),
            Command::Batch { description, .. } => description.clone(),
        }
    }
}

// ============================================================================
// Undo Stack
// ============================================================================

/// Configuration for the undo stack
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of commands to keep in history
    pub max_history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self { max_history: 100 }
    }
}

/// The undo/redo history stack.
///
/// Pushing a new command clears the redo stack. Undo moves a command from
/// the undo stack to the redo stack, redo moves it back.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    config: UndoConfig,
}

impl UndoStack {
    /// Create a new empty undo stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Push a command to the undo stack.
    /// This clears the redo stack (can't redo after a new action).
    pub fn push(&mut self, command: Command) {
        log::debug!("📝 Undo: pushed '{}'", command.description());
        self.undo_stack.push(command);
        self.redo_stack.clear();

        let overflow = self.undo_stack.len().saturating_sub(self.config.max_history);
        if overflow > 0 {
            self.undo_stack.drain(..overflow);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pop a command for undoing; it moves to the redo stack.
    pub fn pop_undo(&mut self) -> Option<Command> {
        let cmd = self.undo_stack.pop()?;
        log::debug!("⏪ Undo: '{}'", cmd.description());
        self.redo_stack.push(cmd.clone());
        Some(cmd)
    }

    /// Pop a command for redoing; it moves back to the undo stack.
    pub fn pop_redo(&mut self) -> Option<Command> {
        let cmd = self.redo_stack.pop()?;
        log::debug!("⏩ Redo: '{}'", cmd.description());
        self.undo_stack.push(cmd.clone());
        Some(cmd)
    }

    /// Get the description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(Command::description)
    }

    /// Get the description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(Command::description)
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Undo/Redo Execution
// ============================================================================

/// Undo the most recent command against `edits`.
/// Returns false if there was nothing to undo.
pub fn undo_command(stack: &mut UndoStack, edits: &mut ManualEdits) -> bool {
    let Some(cmd) = stack.pop_undo() else {
        return false;
    };
    apply_undo(&cmd, edits);
    true
}

/// Redo the most recently undone command against `edits`.
/// Returns false if there was nothing to redo.
pub fn redo_command(stack: &mut UndoStack, edits: &mut ManualEdits) -> bool {
    let Some(cmd) = stack.pop_redo() else {
        return false;
    };
    apply_redo(&cmd, edits);
    true
}

fn apply_undo(cmd: &Command, edits: &mut ManualEdits) {
    match cmd {
        Command::SetCategory { region_id, old, .. } => {
            edits.classification.restore(*region_id, *old);
        }
        Command::SetRemoved { region_id, removed } => {
            edits.set_removed(*region_id, !removed);
        }
        Command::ReplaceClassification { old, .. } => {
            edits.classification = old.clone();
        }
        Command::Batch { commands, .. } => {
            // Undo batch in reverse order
            for cmd in commands.iter().rev() {
                apply_undo(cmd, edits);
            }
        }
    }
}

/// Apply a command's forward effect.
fn apply_redo(cmd: &Command, edits: &mut ManualEdits) {
    match cmd {
        Command::SetCategory { region_id, new, .. } => {
            edits.classification.restore(*region_id, *new);
        }
        Command::SetRemoved { region_id, removed } => {
            edits.set_removed(*region_id, *removed);
        }
        Command::ReplaceClassification { new, .. } => {
            edits.classification = new.clone();
        }
        Command::Batch { commands, .. } => {
            for cmd in commands {
                apply_redo(cmd, edits);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
