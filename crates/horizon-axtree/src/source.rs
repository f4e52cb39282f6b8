//! The tree collaborator boundary.
//!
//! Text navigation never holds references into a tree; it resolves
//! `(TreeId, NodeId)` pairs through a [`TreeSource`] on every use. A single
//! [`Tree`] is its own source; a [`TreeCollection`] resolves across a set of
//! trees so positions can cross into embedded sub-documents.

use std::collections::HashMap;

use crate::ids::{NodeId, TreeId};
use crate::node::NodeRef;
use crate::tree::Tree;

/// Read-only access to a set of accessibility trees.
///
/// This is the seam between the text engine and whatever owns the trees.
/// Implementations must return the *current* state on every call; callers
/// compare [`TreeSource::generation`] snapshots to detect concurrent
/// mutation.
pub trait TreeSource {
    /// Looks up a tree by id.
    fn tree(&self, id: TreeId) -> Option<&Tree>;

    /// The generation counter of the given tree.
    fn generation(&self, id: TreeId) -> Option<u64> {
        self.tree(id).map(Tree::generation)
    }
}

impl dyn TreeSource + '_ {
    /// Resolves a node handle through this source.
    pub fn node(&self, tree: TreeId, node: NodeId) -> Option<NodeRef<'_>> {
        NodeRef::resolve(self, tree, node)
    }
}

impl TreeSource for Tree {
    fn tree(&self, id: TreeId) -> Option<&Tree> {
        (self.id() == id).then_some(self)
    }
}

/// A set of trees forming one logical document with embedded sub-documents.
///
/// Host links are recorded on the embedded tree ([`Tree::host`]); the
/// hosting node carries the forward link
/// ([`NodeData::child_tree`](crate::NodeData::child_tree)).
#[derive(Debug, Default)]
pub struct TreeCollection {
    trees: HashMap<TreeId, Tree>,
}

impl TreeCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tree, replacing any previous tree with the same id.
    pub fn insert(&mut self, tree: Tree) {
        self.trees.insert(tree.id(), tree);
    }

    /// Removes a tree, returning it if present.
    ///
    /// Positions anchored in a removed tree resolve to nothing afterward;
    /// the normalization layer reports them as unavailable.
    pub fn remove(&mut self, id: TreeId) -> Option<Tree> {
        self.trees.remove(&id)
    }

    /// Mutable access to a tree, for the owner's update path.
    pub fn tree_mut(&mut self, id: TreeId) -> Option<&mut Tree> {
        self.trees.get_mut(&id)
    }

    /// Embeds `child` under `host_node` of `host_tree`, wiring both
    /// directions of the link.
    pub fn embed(
        &mut self,
        host_tree: TreeId,
        host_node: NodeId,
        mut child: Tree,
    ) -> crate::TreeResult<()> {
        let child_id = child.id();
        let host = self
            .trees
            .get_mut(&host_tree)
            .ok_or(crate::TreeError::UnknownNode(host_node, host_tree))?;
        host.update_node(host_node, |node| node.set_child_tree(Some(child_id)))?;
        child.set_host(Some((host_tree, host_node)));
        self.trees.insert(child_id, child);
        Ok(())
    }

    /// Number of trees in the collection.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the collection holds no trees.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl TreeSource for TreeCollection {
    fn tree(&self, id: TreeId) -> Option<&Tree> {
        self.trees.get(&id)
    }
}
