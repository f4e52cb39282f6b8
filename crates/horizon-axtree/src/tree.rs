//! The accessibility tree store.
//!
//! A [`Tree`] owns its nodes and a parent back-link table, and counts a
//! generation that is bumped on every mutation. Text navigation code only
//! ever reads a tree; mutation happens on the owner's side (the process
//! translating UI state into accessibility updates), and consumers detect
//! concurrent mutation by comparing generations.

use std::collections::HashMap;

use crate::ids::{NodeId, TreeId};
use crate::node::NodeData;

/// Result type alias for tree mutations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;

/// Errors raised by tree mutators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The referenced node does not exist in this tree.
    #[error("unknown node {0} in {1}")]
    UnknownNode(NodeId, TreeId),

    /// A node with this id already exists in this tree.
    #[error("duplicate node {0} in {1}")]
    DuplicateNode(NodeId, TreeId),

    /// The tree already has a root.
    #[error("{0} already has a root")]
    RootAlreadySet(TreeId),

    /// A child insertion index was out of bounds.
    #[error("child index {index} out of bounds for {parent} ({len} children)")]
    ChildIndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },
}

/// One accessibility tree: a root, a node table, and a generation counter.
///
/// # Generation counter
///
/// Every mutation increments [`Tree::generation`]. Positions and ranges
/// snapshot the generation they were created against and revalidate
/// themselves when it no longer matches; the counter never goes backward.
///
/// # Ownership
///
/// The parent relation is a back-link table (`child id -> parent id`),
/// never an owning reference, so removing a subtree cannot leave dangling
/// parent pointers — a stale `(TreeId, NodeId)` simply fails to resolve.
#[derive(Debug, Clone)]
pub struct Tree {
    id: TreeId,
    root: Option<NodeId>,
    nodes: HashMap<NodeId, NodeData>,
    parents: HashMap<NodeId, NodeId>,
    /// The node hosting this tree as an embedded sub-document, if any.
    host: Option<(TreeId, NodeId)>,
    generation: u64,
}

impl Tree {
    /// Creates an empty tree.
    pub fn new(id: TreeId) -> Self {
        Self {
            id,
            root: None,
            nodes: HashMap::new(),
            parents: HashMap::new(),
            host: None,
            generation: 0,
        }
    }

    /// This tree's id.
    #[inline]
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// The root node id, if the tree is non-empty.
    #[inline]
    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// The current generation. Bumped on every mutation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the tree has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The `(tree, node)` pair hosting this tree as a sub-document.
    #[inline]
    pub fn host(&self) -> Option<(TreeId, NodeId)> {
        self.host
    }

    /// Records the node hosting this tree.
    pub fn set_host(&mut self, host: Option<(TreeId, NodeId)>) {
        self.host = host;
        self.bump();
    }

    /// Looks up a node's data.
    pub fn node_data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(&id)
    }

    /// Looks up a node's parent id.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    fn bump(&mut self) {
        self.generation += 1;
    }

    // =========================================================================
    // Mutators (owner side)
    // =========================================================================

    /// Installs the root node of an empty tree.
    pub fn set_root(&mut self, data: NodeData) -> TreeResult<()> {
        if self.root.is_some() {
            return Err(TreeError::RootAlreadySet(self.id));
        }
        let id = data.id();
        if self.nodes.contains_key(&id) {
            return Err(TreeError::DuplicateNode(id, self.id));
        }
        tracing::debug!(target: crate::targets::TREE, tree = %self.id, root = %id, "set root");
        self.root = Some(id);
        self.nodes.insert(id, data);
        self.bump();
        Ok(())
    }

    /// Appends `data` as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, data: NodeData) -> TreeResult<()> {
        let len = self.child_len(parent)?;
        self.insert_child(parent, len, data)
    }

    /// Inserts `data` as a child of `parent` at `index`.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, data: NodeData) -> TreeResult<()> {
        let id = data.id();
        if self.nodes.contains_key(&id) {
            return Err(TreeError::DuplicateNode(id, self.id));
        }
        let tree_id = self.id;
        let parent_data = self
            .nodes
            .get_mut(&parent)
            .ok_or(TreeError::UnknownNode(parent, tree_id))?;
        let len = parent_data.child_ids().len();
        if index > len {
            return Err(TreeError::ChildIndexOutOfBounds { parent, index, len });
        }
        parent_data.child_ids_mut().insert(index, id);
        self.parents.insert(id, parent);
        self.nodes.insert(id, data);
        tracing::debug!(
            target: crate::targets::TREE,
            tree = %tree_id, parent = %parent, node = %id, index,
            "insert child"
        );
        self.bump();
        Ok(())
    }

    fn child_len(&self, parent: NodeId) -> TreeResult<usize> {
        self.nodes
            .get(&parent)
            .map(|data| data.child_ids().len())
            .ok_or(TreeError::UnknownNode(parent, self.id))
    }

    /// Removes a node and its whole subtree.
    ///
    /// Removing the root empties the tree.
    pub fn remove_subtree(&mut self, id: NodeId) -> TreeResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(TreeError::UnknownNode(id, self.id));
        }
        if let Some(parent) = self.parents.remove(&id) {
            if let Some(parent_data) = self.nodes.get_mut(&parent) {
                parent_data.child_ids_mut().retain(|&child| child != id);
            }
        }
        let mut stack = vec![id];
        let mut removed = 0usize;
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.remove(&current) {
                removed += 1;
                for &child in data.child_ids() {
                    self.parents.remove(&child);
                    stack.push(child);
                }
            }
        }
        if self.root == Some(id) {
            self.root = None;
        }
        tracing::debug!(
            target: crate::targets::TREE,
            tree = %self.id, node = %id, removed,
            "remove subtree"
        );
        self.bump();
        Ok(())
    }

    /// Replaces a node's text.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> TreeResult<()> {
        self.update_node(id, |node| node.set_text(text))
    }

    /// Sets a node's ignored flag.
    pub fn set_ignored(&mut self, id: NodeId, ignored: bool) -> TreeResult<()> {
        self.update_node(id, |node| node.set_ignored(ignored))
    }

    /// Applies an arbitrary edit to one node's data, bumping the generation.
    ///
    /// The structural links (`child_ids`) must not be edited through this
    /// entry point; use the insert/remove mutators for structure.
    pub fn update_node(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut NodeData),
    ) -> TreeResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(TreeError::UnknownNode(id, self.id))?;
        edit(node);
        self.bump();
        Ok(())
    }
}
