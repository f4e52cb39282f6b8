//! Accessibility tree data model for Horizon assistive technology support.
//!
//! This crate provides the foundational data layer consumed by the text
//! navigation engine in `horizon-axtext`:
//!
//! - **Identity**: `(TreeId, NodeId)` value addressing; no references held
//!   across calls, so removed nodes cannot dangle
//! - **Nodes**: roles, UTF-16 text, ignored/invisible flags, typed
//!   attribute tables, ordered children, cross-tree embedding links
//! - **Trees**: a read-mostly store with a generation counter bumped on
//!   every mutation, for staleness detection
//! - **Sources**: the [`TreeSource`] collaborator trait and
//!   [`TreeCollection`] for documents with embedded sub-documents
//!
//! # Example
//!
//! ```
//! use horizon_axtree::{NodeData, NodeId, NodeRef, Role, Tree, TreeId};
//!
//! let mut tree = Tree::new(TreeId::new(1));
//! tree.set_root(NodeData::new(NodeId::new(1), Role::Document)).unwrap();
//! tree.push_child(
//!     NodeId::new(1),
//!     NodeData::new(NodeId::new(2), Role::StaticText).with_text("hello"),
//! )
//! .unwrap();
//!
//! let root = NodeRef::resolve(&tree, TreeId::new(1), NodeId::new(1)).unwrap();
//! assert_eq!(root.max_text_offset(), 5);
//! ```

mod attr;
mod ids;
mod node;
mod role;
mod source;
mod tree;

pub use attr::{BoolAttr, FloatAttr, IntAttr, IntListAttr, StrAttr};
pub use ids::{NodeId, TreeId};
pub use node::{NodeBounds, NodeData, NodeRef, OBJECT_REPLACEMENT_CHAR};
pub use role::Role;
pub use source::{TreeCollection, TreeSource};
pub use tree::{Tree, TreeError, TreeResult};

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Tree store mutations.
    pub const TREE: &str = "horizon_axtree::tree";
    /// Node resolution and traversal.
    pub const NODE: &str = "horizon_axtree::node";
}

static_assertions::assert_impl_all!(NodeData: Send, Sync, Clone);
static_assertions::assert_impl_all!(Tree: Send, Sync, Clone);
