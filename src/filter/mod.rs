//! Boolean filter trees deciding which regions are kept or removed.
//!
//! A tree is evaluated in one of two modes:
//!
//! - **Display mode** applies each group's keep/remove polarity and is used
//!   for live filtering (`false` means the region is hidden).
//! - **Pipeline mode** returns the raw predicate match and is used as the
//!   precondition of classification rules.

mod config;
mod evaluate;
mod tree;

pub use config::{DEFAULT_MAX_DEPTH, FILTER_CONFIG_VERSION, FilterConfig, ROOT_NODE_ID};
pub use evaluate::{evaluate, excluded_ids};
pub use tree::{
    FilterAction, FilterCondition, FilterGroup, FilterLogic, FilterNode, NodeId, NodeRef,
    NodeUpdate,
};
