//! Directory-backed JSON persistence of curation state.
//!
//! Each piece of state lives in its own file so external tools can read
//! them individually. Missing files load as defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CurateError, Result};
use crate::filter::FilterConfig;
use crate::model::{AnnotationRegion, CategoryList, ClassificationMap, ManualEdits, RegionId};
use crate::pipeline::RuleList;

/// Everything the operator can save for one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurationState {
    pub filter: FilterConfig,
    pub rules: RuleList,
    pub categories: CategoryList,
    pub edits: ManualEdits,
}

/// Curation state stored as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct CurationStore {
    dir: PathBuf,
}

impl CurationStore {
    pub const FILTER_CONFIG_FILE: &'static str = "filter_config.json";
    pub const RULES_FILE: &'static str = "classification_rules.json";
    pub const CATEGORIES_FILE: &'static str = "categories.json";
    pub const CLASSIFICATION_FILE: &'static str = "classification.json";
    pub const REMOVED_FILE: &'static str = "removed_ids.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load all state files. Missing files fall back to defaults.
    pub fn load(&self) -> Result<CurationState> {
        let filter = match read_optional(&self.path(Self::FILTER_CONFIG_FILE))? {
            Some(json) => FilterConfig::from_json(&json)?,
            None => FilterConfig::default(),
        };
        let rules: RuleList = self.load_json(Self::RULES_FILE)?;
        let categories: CategoryList = self.load_json(Self::CATEGORIES_FILE)?;
        let classification: ClassificationMap = self.load_json(Self::CLASSIFICATION_FILE)?;
        let removed: Vec<RegionId> = self.load_json(Self::REMOVED_FILE)?;

        log::info!(
            "Loaded curation state from {:?}: {} rules, {} categories, {} classified, {} removed",
            self.dir,
            rules.len(),
            categories.len(),
            classification.len(),
            removed.len()
        );
        Ok(CurationState {
            filter,
            rules,
            categories,
            edits: ManualEdits::new(removed.into_iter().collect(), classification),
        })
    }

    /// Write every state file.
    pub fn save(&self, state: &CurationState) -> Result<()> {
        self.save_filter(&state.filter)?;
        self.save_json(Self::RULES_FILE, &state.rules)?;
        self.save_json(Self::CATEGORIES_FILE, &state.categories)?;
        self.save_classification(&state.edits.classification)?;
        let removed: Vec<RegionId> = state.edits.removed_ids.iter().copied().collect();
        self.save_json(Self::REMOVED_FILE, &removed)?;
        log::info!("Saved curation state to {:?}", self.dir);
        Ok(())
    }

    pub fn save_filter(&self, filter: &FilterConfig) -> Result<()> {
        self.save_json(Self::FILTER_CONFIG_FILE, filter)
    }

    pub fn save_classification(&self, classification: &ClassificationMap) -> Result<()> {
        self.save_json(Self::CLASSIFICATION_FILE, classification)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn load_json<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        match read_optional(&self.path(file))? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(T::default()),
        }
    }

    /// Write one state file, creating the directory if needed.
    fn save_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| CurateError::io(&self.dir, e))?;
        let path = self.path(file);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).map_err(|e| CurateError::io(&path, e))?;
        log::debug!("Wrote {:?}", path);
        Ok(())
    }
}

/// Load a region list exported by the data-loading side.
pub fn load_regions(path: &Path) -> Result<Vec<AnnotationRegion>> {
    let json = fs::read_to_string(path).map_err(|e| CurateError::io(path, e))?;
    let regions: Vec<AnnotationRegion> = serde_json::from_str(&json)?;
    log::info!("Loaded {} regions from {:?}", regions.len(), path);
    Ok(regions)
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        log::debug!("No state file at {:?}", path);
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| CurateError::io(path, e))
}
