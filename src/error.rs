//! Error types for curation state operations.
//!
//! The evaluation core (filters, pipeline, geometry, selection) is total and
//! never fails. Errors only arise from editing operations that would break a
//! tree or category invariant, and from loading/saving state.

use std::path::PathBuf;
use thiserror::Error;

use crate::filter::NodeId;
use crate::model::CategoryId;

/// Errors that can occur while editing or persisting curation state.
#[derive(Error, Debug)]
pub enum CurateError {
    /// I/O error during file operations
    #[error("IO error on {path:?}: {source}")]
    Io {
        /// File that was being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Referenced filter node does not exist in the tree
    #[error("Filter node not found: {id}")]
    NodeNotFound {
        /// The missing node ID
        id: NodeId,
    },

    /// Target node exists but cannot hold children
    #[error("Filter node {id} is a condition and cannot have children")]
    NotAGroup {
        /// The condition node ID
        id: NodeId,
    },

    /// Adding a group would nest deeper than the configured maximum
    #[error("Filter tree depth {depth} exceeds maximum {max_depth}")]
    DepthExceeded {
        /// Depth the tree would reach
        depth: usize,
        /// Configured maximum depth
        max_depth: usize,
    },

    /// Node ID already used elsewhere in the tree
    #[error("Duplicate filter node id: {id}")]
    DuplicateNode {
        /// The duplicated node ID
        id: NodeId,
    },

    /// Category ID referenced but not defined
    #[error("Category not found: {id}")]
    CategoryNotFound {
        /// The missing category ID
        id: CategoryId,
    },

    /// Category already defined
    #[error("Category already exists: {id}")]
    DuplicateCategory {
        /// The duplicated category ID
        id: CategoryId,
    },

    /// System categories (e.g. trash) cannot be deleted
    #[error("Category {id} is protected and cannot be deleted")]
    ProtectedCategory {
        /// The protected category ID
        id: CategoryId,
    },

    /// Classification rule referenced but not defined
    #[error("Classification rule not found: {id}")]
    RuleNotFound {
        /// The missing rule ID
        id: u64,
    },

    /// Configuration file version is newer than supported
    #[error("Settings file version {file_version} is newer than supported version {supported_version}")]
    VersionTooNew {
        /// Version found in the file
        file_version: u32,
        /// Highest version this build understands
        supported_version: u32,
    },
}

impl CurateError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results in this crate.
pub type Result<T, E = CurateError> = std::result::Result<T, E>;
