//! Text positions over accessibility trees.
//!
//! A [`TextPosition`] identifies a location in a document: either a point
//! between two children of a node (a *tree position*) or a character offset
//! into a node's text (a *text position*). Positions are immutable value
//! types — every navigation operation returns a new position — and they do
//! not own the node they anchor to: the `(TreeId, NodeId)` pair is
//! re-resolved against the live tree on every use, so concurrent tree
//! mutation can never leave a position dangling, only stale.
//!
//! Offsets are UTF-16 code units, matching what assistive technologies
//! exchange. Out-of-range offsets are representable on purpose: the tree
//! may shrink after a position is created, so validity is checked lazily
//! via [`TextPosition::is_valid`] and repaired by the validation layer
//! rather than rejected at construction.

use std::cmp::Ordering;

use horizon_axtree::{NodeId, NodeRef, TreeId, TreeSource};

use crate::error::{Error, Result};

/// Disambiguates a text offset that sits exactly on a soft line wrap.
///
/// At a wrapped line boundary the same offset is both the end of one visual
/// line and the start of the next. `Downstream` binds the position to the
/// start of the next line; `Upstream` binds it to the end of the previous
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Affinity {
    /// Bind to the following content (default).
    #[default]
    Downstream,
    /// Bind to the preceding content.
    Upstream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PositionKind {
    Null,
    Tree {
        tree: TreeId,
        anchor: NodeId,
        child_index: usize,
    },
    Text {
        tree: TreeId,
        anchor: NodeId,
        offset: usize,
        affinity: Affinity,
    },
}

/// A location in an accessibility document.
///
/// See the [module documentation](self) for the anchoring and validity
/// model. Equality is structural (same variant, anchor, offset, affinity);
/// use [`TextPosition::compare`] for the semantic document order, under
/// which the end of one leaf and the start of the next adjacent leaf are
/// the *same* place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPosition {
    pub(crate) kind: PositionKind,
}

impl TextPosition {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates the null position.
    ///
    /// Null is the explicit "nowhere" value: operations on it succeed and
    /// propagate null rather than failing, mirroring how an invalid
    /// `ModelIndex` behaves in the widget model layer.
    #[inline]
    pub const fn null() -> Self {
        Self {
            kind: PositionKind::Null,
        }
    }

    /// Creates a tree position: a point between the children of `anchor`.
    ///
    /// `child_index` may equal the anchor's child count, meaning "after the
    /// last child". Returns null if the anchor does not currently exist.
    pub fn tree_position(
        source: &dyn TreeSource,
        tree: TreeId,
        anchor: NodeId,
        child_index: usize,
    ) -> Self {
        if source.node(tree, anchor).is_none() {
            return Self::null();
        }
        Self {
            kind: PositionKind::Tree {
                tree,
                anchor,
                child_index,
            },
        }
    }

    /// Creates a text position: a UTF-16 offset into `anchor`'s exposed
    /// text.
    ///
    /// Returns null if the anchor does not currently exist. The offset is
    /// deliberately *not* clamped here: the tree may shrink between
    /// construction and use, so bounds are checked lazily by
    /// [`is_valid`](Self::is_valid) and repaired by the validation layer.
    pub fn text_position(
        source: &dyn TreeSource,
        tree: TreeId,
        anchor: NodeId,
        offset: usize,
        affinity: Affinity,
    ) -> Self {
        if source.node(tree, anchor).is_none() {
            return Self::null();
        }
        Self {
            kind: PositionKind::Text {
                tree,
                anchor,
                offset,
                affinity,
            },
        }
    }

    pub(crate) fn text_position_unchecked(
        tree: TreeId,
        anchor: NodeId,
        offset: usize,
        affinity: Affinity,
    ) -> Self {
        Self {
            kind: PositionKind::Text {
                tree,
                anchor,
                offset,
                affinity,
            },
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The id of the tree this position is anchored in.
    pub fn tree_id(&self) -> Option<TreeId> {
        match self.kind {
            PositionKind::Null => None,
            PositionKind::Tree { tree, .. } | PositionKind::Text { tree, .. } => Some(tree),
        }
    }

    /// The id of the anchor node.
    pub fn anchor_id(&self) -> Option<NodeId> {
        match self.kind {
            PositionKind::Null => None,
            PositionKind::Tree { anchor, .. } | PositionKind::Text { anchor, .. } => Some(anchor),
        }
    }

    /// The child index of a tree position.
    pub fn child_index(&self) -> Option<usize> {
        match self.kind {
            PositionKind::Tree { child_index, .. } => Some(child_index),
            _ => None,
        }
    }

    /// The text offset of a text position.
    pub fn text_offset(&self) -> Option<usize> {
        match self.kind {
            PositionKind::Text { offset, .. } => Some(offset),
            _ => None,
        }
    }

    /// The affinity of a text position.
    pub fn affinity(&self) -> Option<Affinity> {
        match self.kind {
            PositionKind::Text { affinity, .. } => Some(affinity),
            _ => None,
        }
    }

    /// Resolves the anchor against the live tree.
    pub fn anchor<'a>(&self, source: &'a dyn TreeSource) -> Option<NodeRef<'a>> {
        let (tree, anchor) = match self.kind {
            PositionKind::Null => return None,
            PositionKind::Tree { tree, anchor, .. } | PositionKind::Text { tree, anchor, .. } => {
                (tree, anchor)
            }
        };
        source.node(tree, anchor)
    }

    fn require_anchor<'a>(&self, source: &'a dyn TreeSource) -> Result<NodeRef<'a>> {
        self.anchor(source).ok_or_else(|| {
            Error::invalid_position(format!(
                "anchor {:?} not found in {:?}",
                self.anchor_id(),
                self.tree_id()
            ))
        })
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// Whether this is the null position.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.kind, PositionKind::Null)
    }

    /// Whether this is a tree position.
    #[inline]
    pub fn is_tree_position(&self) -> bool {
        matches!(self.kind, PositionKind::Tree { .. })
    }

    /// Whether this is a text position.
    #[inline]
    pub fn is_text_position(&self) -> bool {
        matches!(self.kind, PositionKind::Text { .. })
    }

    /// Whether this position resolves cleanly against the current tree.
    ///
    /// Null is valid (explicitly nowhere). A non-null position is valid
    /// when its anchor exists and its index/offset is within the anchor's
    /// current bounds.
    pub fn is_valid(&self, source: &dyn TreeSource) -> bool {
        match self.kind {
            PositionKind::Null => true,
            PositionKind::Tree { child_index, .. } => match self.anchor(source) {
                Some(anchor) => child_index <= anchor.child_count(),
                None => false,
            },
            PositionKind::Text { offset, .. } => match self.anchor(source) {
                Some(anchor) => offset <= anchor.max_text_offset(),
                None => false,
            },
        }
    }

    /// Whether the anchor is excluded from text and boundary computation.
    pub fn is_ignored(&self, source: &dyn TreeSource) -> bool {
        self.anchor(source).is_some_and(|anchor| anchor.is_ignored())
    }

    /// Whether this position sits at the start of its anchor.
    pub fn at_start_of_anchor(&self) -> bool {
        match self.kind {
            PositionKind::Null => false,
            PositionKind::Tree { child_index, .. } => child_index == 0,
            PositionKind::Text { offset, .. } => offset == 0,
        }
    }

    /// Whether this position sits at the end of its anchor.
    pub fn at_end_of_anchor(&self, source: &dyn TreeSource) -> bool {
        match self.kind {
            PositionKind::Null => false,
            PositionKind::Tree { child_index, .. } => self
                .anchor(source)
                .is_some_and(|anchor| child_index == anchor.child_count()),
            PositionKind::Text { offset, .. } => self
                .anchor(source)
                .is_some_and(|anchor| offset == anchor.max_text_offset()),
        }
    }

    /// Whether no unignored content precedes this position.
    pub fn at_start_of_document(&self, source: &dyn TreeSource) -> bool {
        match self.as_leaf_text_position(source) {
            Ok(leaf_pos) if !leaf_pos.is_null() => {
                leaf_pos.at_start_of_anchor()
                    && leaf_pos
                        .anchor(source)
                        .is_some_and(|leaf| leaf.previous_unignored_leaf().is_none())
            }
            _ => false,
        }
    }

    /// Whether no unignored content follows this position.
    pub fn at_end_of_document(&self, source: &dyn TreeSource) -> bool {
        match self.as_leaf_text_position(source) {
            Ok(leaf_pos) if !leaf_pos.is_null() => {
                leaf_pos.at_end_of_anchor(source)
                    && leaf_pos
                        .anchor(source)
                        .is_some_and(|leaf| leaf.next_unignored_leaf().is_none())
            }
            _ => false,
        }
    }

    /// The anchor's total exposed text length in UTF-16 code units.
    pub fn max_text_offset(&self, source: &dyn TreeSource) -> Result<usize> {
        Ok(self.require_anchor(source)?.max_text_offset())
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Converts to a tree position, locating the child whose text span
    /// contains the offset.
    ///
    /// Null converts to null. A leaf anchor converts to child index 0 (a
    /// leaf has no children, so that is also "after the last child").
    pub fn as_tree_position(&self, source: &dyn TreeSource) -> Result<TextPosition> {
        match self.kind {
            PositionKind::Null => Ok(Self::null()),
            PositionKind::Tree { .. } => {
                self.require_anchor(source)?;
                Ok(self.clone())
            }
            PositionKind::Text { tree, anchor, offset, .. } => {
                let node = self.require_anchor(source)?;
                if node.is_leaf() {
                    return Ok(Self {
                        kind: PositionKind::Tree {
                            tree,
                            anchor,
                            child_index: 0,
                        },
                    });
                }
                let mut remaining = offset;
                let count = node.child_count();
                for index in 0..count {
                    let len = node
                        .child_at(index)
                        .map(|child| child.max_text_offset())
                        .unwrap_or(0);
                    if remaining < len {
                        return Ok(Self {
                            kind: PositionKind::Tree {
                                tree,
                                anchor,
                                child_index: index,
                            },
                        });
                    }
                    remaining -= len;
                }
                Ok(Self {
                    kind: PositionKind::Tree {
                        tree,
                        anchor,
                        child_index: count,
                    },
                })
            }
        }
    }

    /// Converts to a text position anchored at the same node.
    ///
    /// A tree position converts by summing the exposed text of the children
    /// preceding its child index. Null converts to null.
    pub fn as_text_position(&self, source: &dyn TreeSource) -> Result<TextPosition> {
        match self.kind {
            PositionKind::Null => Ok(Self::null()),
            PositionKind::Text { .. } => {
                self.require_anchor(source)?;
                Ok(self.clone())
            }
            PositionKind::Tree { tree, anchor, child_index } => {
                let node = self.require_anchor(source)?;
                let count = node.child_count();
                if child_index > count {
                    return Err(Error::invalid_position(format!(
                        "child index {child_index} out of bounds ({count} children)"
                    )));
                }
                let offset: usize = (0..child_index)
                    .filter_map(|i| node.child_at(i))
                    .map(|child| child.max_text_offset())
                    .sum();
                Ok(Self::text_position_unchecked(
                    tree,
                    anchor,
                    offset,
                    Affinity::Downstream,
                ))
            }
        }
    }

    /// Converts to the canonical leaf text position: the position re-anchored
    /// at the unignored leaf whose text span contains the offset.
    ///
    /// This is the form the boundary algebra operates on. At an exact
    /// boundary between two leaves, `Downstream` affinity resolves to the
    /// start of the following leaf and `Upstream` to the end of the
    /// preceding one.
    pub fn as_leaf_text_position(&self, source: &dyn TreeSource) -> Result<TextPosition> {
        let text_pos = self.as_text_position(source)?;
        let PositionKind::Text { offset, affinity, .. } = text_pos.kind else {
            return Ok(Self::null());
        };
        let mut node = text_pos.require_anchor(source)?;
        if offset > node.max_text_offset() {
            return Err(Error::invalid_position(format!(
                "offset {offset} exceeds anchor length {}",
                node.max_text_offset()
            )));
        }
        let mut remaining = offset;
        while !node.is_leaf() {
            let count = node.child_count();
            let mut chosen = None;
            let mut consumed = 0usize;
            for index in 0..count {
                let Some(child) = node.child_at(index) else {
                    continue;
                };
                let len = child.max_text_offset();
                if remaining - consumed < len || index + 1 == count {
                    // Upstream affinity binds an exact boundary offset to the
                    // preceding child's end rather than this child's start.
                    if affinity == Affinity::Upstream && remaining == consumed && index > 0 {
                        if let Some(prev) = (0..index)
                            .rev()
                            .filter_map(|i| node.child_at(i))
                            .find(|c| c.max_text_offset() > 0)
                        {
                            chosen = Some((prev, prev.max_text_offset()));
                            break;
                        }
                    }
                    chosen = Some((child, remaining - consumed));
                    break;
                }
                consumed += len;
            }
            match chosen {
                Some((child, child_offset)) => {
                    node = child;
                    remaining = child_offset;
                }
                None => return Ok(Self::null()),
            }
        }
        Ok(Self::text_position_unchecked(
            node.tree_id(),
            node.id(),
            remaining,
            affinity,
        ))
    }

    // =========================================================================
    // Ordering
    // =========================================================================

    /// The root node of the document this position belongs to, following
    /// host links out of embedded sub-documents.
    pub(crate) fn document_root<'a>(&self, source: &'a dyn TreeSource) -> Option<NodeRef<'a>> {
        let mut node = self.anchor(source)?;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        Some(node)
    }

    /// This position's absolute offset in document text order.
    ///
    /// The offset of the leaf-resolved position plus the exposed length of
    /// every unignored leaf before it. Equivalent boundary positions on two
    /// adjacent leaves map to the same offset, which is exactly the
    /// equivalence the comparison contract requires.
    pub(crate) fn document_offset(&self, source: &dyn TreeSource) -> Result<usize> {
        let leaf_pos = self.as_leaf_text_position(source)?;
        let PositionKind::Text { offset, .. } = leaf_pos.kind else {
            return Err(Error::invalid_position("cannot measure a null position"));
        };
        let leaf = leaf_pos.require_anchor(source)?;
        let mut total = offset;
        let mut current = leaf;
        while let Some(prev) = current.previous_unignored_leaf() {
            total += prev.text_utf16().len();
            current = prev;
        }
        Ok(total)
    }

    /// Compares two positions in document order.
    ///
    /// Null compares equal to null and before everything else. Positions in
    /// unrelated documents cannot be ordered and yield `InvalidOperation`.
    /// Positions that resolve to the same document offset compare equal
    /// even when anchored on different nodes — "end of leaf A" and "start
    /// of the next leaf B" are the same place.
    pub fn compare(&self, other: &TextPosition, source: &dyn TreeSource) -> Result<Ordering> {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ok(Ordering::Equal),
            (true, false) => return Ok(Ordering::Less),
            (false, true) => return Ok(Ordering::Greater),
            (false, false) => {}
        }
        let self_root = self
            .document_root(source)
            .ok_or_else(|| Error::invalid_position("anchor not found"))?;
        let other_root = other
            .document_root(source)
            .ok_or_else(|| Error::invalid_position("anchor not found"))?;
        if !self_root.same_node(&other_root) {
            return Err(Error::invalid_operation(
                "positions belong to unrelated documents",
            ));
        }
        Ok(self.document_offset(source)?.cmp(&other.document_offset(source)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_axtree::{NodeData, Role, Tree};

    fn two_leaf_tree() -> Tree {
        let mut tree = Tree::new(TreeId::new(1));
        tree.set_root(NodeData::new(NodeId::new(1), Role::Document)).unwrap();
        tree.push_child(
            NodeId::new(1),
            NodeData::new(NodeId::new(2), Role::StaticText).with_text("some text"),
        )
        .unwrap();
        tree.push_child(
            NodeId::new(1),
            NodeData::new(NodeId::new(3), Role::StaticText).with_text("more text"),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_null_position() {
        let pos = TextPosition::null();
        assert!(pos.is_null());
        assert!(!pos.is_text_position());
        assert!(pos.tree_id().is_none());
    }

    #[test]
    fn test_missing_anchor_constructs_null() {
        let tree = two_leaf_tree();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(99),
            0,
            Affinity::Downstream,
        );
        assert!(pos.is_null());
    }

    #[test]
    fn test_out_of_range_offset_is_representable_but_invalid() {
        let tree = two_leaf_tree();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(2),
            50,
            Affinity::Downstream,
        );
        assert!(!pos.is_null());
        assert!(!pos.is_valid(&tree));
    }

    #[test]
    fn test_validity_rechecked_after_shrink() {
        let mut tree = two_leaf_tree();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(2),
            9,
            Affinity::Downstream,
        );
        assert!(pos.is_valid(&tree));

        tree.set_text(NodeId::new(2), "some").unwrap();
        assert!(!pos.is_valid(&tree));
    }

    #[test]
    fn test_tree_to_text_conversion() {
        let tree = two_leaf_tree();
        let before_second = TextPosition::tree_position(&tree, TreeId::new(1), NodeId::new(1), 1);
        let text = before_second.as_text_position(&tree).unwrap();
        assert_eq!(text.text_offset(), Some(9));

        let after_last = TextPosition::tree_position(&tree, TreeId::new(1), NodeId::new(1), 2);
        assert_eq!(after_last.as_text_position(&tree).unwrap().text_offset(), Some(18));
    }

    #[test]
    fn test_text_to_tree_conversion() {
        let tree = two_leaf_tree();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(1),
            10,
            Affinity::Downstream,
        );
        let tree_pos = pos.as_tree_position(&tree).unwrap();
        assert_eq!(tree_pos.child_index(), Some(1));
    }

    #[test]
    fn test_leaf_resolution_downstream() {
        let tree = two_leaf_tree();
        // Offset 9 on the root is the boundary between the two leaves.
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(1),
            9,
            Affinity::Downstream,
        );
        let leaf = pos.as_leaf_text_position(&tree).unwrap();
        assert_eq!(leaf.anchor_id(), Some(NodeId::new(3)));
        assert_eq!(leaf.text_offset(), Some(0));
    }

    #[test]
    fn test_leaf_resolution_upstream() {
        let tree = two_leaf_tree();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(1),
            9,
            Affinity::Upstream,
        );
        let leaf = pos.as_leaf_text_position(&tree).unwrap();
        assert_eq!(leaf.anchor_id(), Some(NodeId::new(2)));
        assert_eq!(leaf.text_offset(), Some(9));
    }

    #[test]
    fn test_boundary_positions_compare_equal() {
        let tree = two_leaf_tree();
        let end_of_first = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(2),
            9,
            Affinity::Downstream,
        );
        let start_of_second = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(3),
            0,
            Affinity::Downstream,
        );
        assert_eq!(
            end_of_first.compare(&start_of_second, &tree).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_document_order() {
        let tree = two_leaf_tree();
        let early = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(2),
            3,
            Affinity::Downstream,
        );
        let late = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(3),
            3,
            Affinity::Downstream,
        );
        assert_eq!(early.compare(&late, &tree).unwrap(), Ordering::Less);
        assert_eq!(late.compare(&early, &tree).unwrap(), Ordering::Greater);
        assert_eq!(
            TextPosition::null().compare(&early, &tree).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_document_edges() {
        let tree = two_leaf_tree();
        let start = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(2),
            0,
            Affinity::Downstream,
        );
        assert!(start.at_start_of_document(&tree));
        assert!(!start.at_end_of_document(&tree));

        let end = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(3),
            9,
            Affinity::Downstream,
        );
        assert!(end.at_end_of_document(&tree));
    }
}
