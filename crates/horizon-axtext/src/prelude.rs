//! Prelude module for Horizon AxText.
//!
//! This module re-exports the most commonly used types for convenient
//! importing:
//!
//! ```ignore
//! use horizon_axtext::prelude::*;
//! ```

// ============================================================================
// Tree data model
// ============================================================================

pub use horizon_axtree::{
    BoolAttr, FloatAttr, IntAttr, IntListAttr, NodeData, NodeId, NodeRef, Role, StrAttr, Tree,
    TreeCollection, TreeId, TreeSource,
};

// ============================================================================
// Positions
// ============================================================================

pub use crate::position::{Affinity, TextPosition};
pub use crate::normalize::AdjustmentBehavior;

// ============================================================================
// Units and ranges
// ============================================================================

pub use crate::boundary::{BoundaryEdge, MoveDirection, TextUnit};
pub use crate::range::{AttrValue, RangeAttribute, RangeEndpoint, TextRange};

// ============================================================================
// Errors
// ============================================================================

pub use crate::error::{Error, Result};
