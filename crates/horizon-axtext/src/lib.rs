//! Text position and range navigation over Horizon accessibility trees.
//!
//! This crate implements the text abstraction assistive technologies
//! navigate with: positions and ranges over an accessibility tree that read
//! as one continuous document even though the tree is sparse, contains
//! ignored content, may span embedded sub-documents, and may mutate between
//! calls.
//!
//! - [`TextPosition`]: an immutable value identifying a spot in the
//!   document — a point between children or a UTF-16 offset into a node's
//!   text, with an affinity for soft line wraps
//! - Position algebra: movement and boundary tests by character, word,
//!   line, paragraph, page, format run, and document
//! - [`TextRange`]: an ordered pair of positions supporting comparison,
//!   text extraction, movement, expansion to enclosing units, and text or
//!   attribute search
//! - Validation: [`TextPosition::as_valid_position`] and range
//!   renormalization repair stale snapshots after the tree mutates
//!
//! # Example
//!
//! ```
//! use horizon_axtree::{NodeData, NodeId, Role, Tree, TreeId};
//! use horizon_axtext::{Affinity, TextPosition, TextRange, TextUnit};
//!
//! let mut tree = Tree::new(TreeId::new(1));
//! tree.set_root(NodeData::new(NodeId::new(1), Role::Document)).unwrap();
//! tree.push_child(
//!     NodeId::new(1),
//!     NodeData::new(NodeId::new(2), Role::StaticText).with_text("some text"),
//! )
//! .unwrap();
//! tree.push_child(
//!     NodeId::new(1),
//!     NodeData::new(NodeId::new(3), Role::StaticText).with_text("more text"),
//! )
//! .unwrap();
//!
//! let caret = TextPosition::text_position(
//!     &tree,
//!     TreeId::new(1),
//!     NodeId::new(1),
//!     0,
//!     Affinity::Downstream,
//! );
//! let range = TextRange::caret(&tree, caret)
//!     .expand_to_enclosing_unit(&tree, TextUnit::Document)
//!     .unwrap();
//! assert_eq!(range.get_text(&tree, None).unwrap(), "some textmore text");
//! ```
//!
//! # Concurrency model
//!
//! Everything here is synchronous and single-threaded: operations run to
//! completion on the caller's thread and hold no locks. The tree may be
//! mutated by its owner between two calls, which is why positions and
//! ranges are snapshots that revalidate against the live
//! [`TreeSource`](horizon_axtree::TreeSource) on every entry point.

mod boundary;
mod error;
mod normalize;
mod position;
mod range;

pub mod prelude;

pub use boundary::{BoundaryEdge, MoveDirection, TextUnit};
pub use error::{Error, Result};
pub use normalize::AdjustmentBehavior;
pub use position::{Affinity, TextPosition};
pub use range::{AttrValue, RangeAttribute, RangeEndpoint, TextRange};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Position repair and renormalization decisions.
    pub const NORMALIZE: &str = "horizon_axtext::normalize";
    /// Range revalidation against tree generations.
    pub const RANGE: &str = "horizon_axtext::range";
    /// Boundary searches and movement.
    pub const BOUNDARY: &str = "horizon_axtext::boundary";
}

static_assertions::assert_impl_all!(TextPosition: Send, Sync, Clone);
static_assertions::assert_impl_all!(TextRange: Send, Sync, Clone);
