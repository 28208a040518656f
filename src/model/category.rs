//! Category data model for region classification.

use serde::{Deserialize, Serialize};

use super::CategoryId;
use crate::error::{CurateError, Result};

/// Category used when neither the classification map nor the region name one.
pub const DEFAULT_CATEGORY: CategoryId = 1;

/// Terminal "remove/trash" category. Protected from deletion.
pub const TRASH_CATEGORY: CategoryId = 999;

/// A classification category with display colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDef {
    /// Unique identifier for the category
    pub id: CategoryId,
    /// Display name of the category
    pub name: String,
    /// Outline color (CSS color string)
    pub color: String,
    /// Fill color (CSS color string, usually translucent)
    pub fill: String,
    /// System categories cannot be deleted
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_system: bool,
}

impl CategoryDef {
    /// Create a new user category.
    pub fn new(id: CategoryId, name: &str, color: &str, fill: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            color: color.to_string(),
            fill: fill.to_string(),
            is_system: false,
        }
    }

    /// Mark this category as a system category.
    pub fn system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Whether deleting this category is forbidden.
    pub fn is_protected(&self) -> bool {
        self.is_system || self.id == TRASH_CATEGORY
    }
}

/// Categories every fresh dataset starts with.
pub fn default_categories() -> Vec<CategoryDef> {
    vec![
        CategoryDef::new(DEFAULT_CATEGORY, "Object", "#4caf50", "rgba(76, 175, 80, 0.3)").system(),
        CategoryDef::new(TRASH_CATEGORY, "Remove", "#f44336", "rgba(244, 67, 54, 0.3)").system(),
    ]
}

/// Ordered list of category definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryList(Vec<CategoryDef>);

impl Default for CategoryList {
    fn default() -> Self {
        Self(default_categories())
    }
}

impl CategoryList {
    pub fn new(categories: Vec<CategoryDef>) -> Self {
        Self(categories)
    }

    pub fn get(&self, id: CategoryId) -> Option<&CategoryDef> {
        self.0.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryDef> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Next unused id, never the trash category id.
    pub fn next_id(&self) -> CategoryId {
        let next = self
            .0
            .iter()
            .map(|c| c.id)
            .filter(|&id| id != TRASH_CATEGORY)
            .max()
            .map_or(DEFAULT_CATEGORY, |id| id + 1);
        if next == TRASH_CATEGORY { next + 1 } else { next }
    }

    /// Add a category. Fails if the id is taken.
    pub fn add(&mut self, category: CategoryDef) -> Result<()> {
        if self.get(category.id).is_some() {
            return Err(CurateError::DuplicateCategory { id: category.id });
        }
        log::debug!("🏷️ Added category: {} (id={})", category.name, category.id);
        self.0.push(category);
        Ok(())
    }

    /// Rename a category.
    pub fn rename(&mut self, id: CategoryId, name: &str) -> Result<()> {
        let category = self
            .0
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CurateError::CategoryNotFound { id })?;
        category.name = name.to_string();
        Ok(())
    }

    /// Delete a category. The trash category and system categories are protected.
    pub fn remove(&mut self, id: CategoryId) -> Result<CategoryDef> {
        let index = self
            .0
            .iter()
            .position(|c| c.id == id)
            .ok_or(CurateError::CategoryNotFound { id })?;
        if self.0[index].is_protected() {
            return Err(CurateError::ProtectedCategory { id });
        }
        let removed = self.0.remove(index);
        log::debug!("🏷️ Removed category: {} (id={})", removed.name, id);
        Ok(removed)
    }
}
