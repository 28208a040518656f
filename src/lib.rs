//! segcurate - Segmentation annotation curation
//!
//! Rule core for curating machine-generated segmentation regions: boolean
//! filter trees, an ordered classification pipeline, polygon hit testing and
//! pointer-driven selection.

pub mod error;
pub mod filter;
pub mod geometry;
pub mod model;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod settings;
pub mod store;
pub mod undo;

pub use error::{CurateError, Result};
pub use filter::{FilterConfig, FilterGroup, FilterNode, evaluate};
pub use model::{AnnotationRegion, ClassificationMap, ManualEdits, Point};
pub use pipeline::{ClassificationRule, RuleList, RuleSource};
pub use selection::{CanvasMapping, Selection, SelectionController, ToggleMode, toggle_regions};
pub use session::CurationSession;
pub use store::{CurationState, CurationStore};
