//! Position repair after tree mutation.
//!
//! Positions are snapshots; the tree they were created against may have
//! mutated since. This module produces the closest valid position on the
//! *current* tree: anchors that vanished clamp into the surviving document,
//! offsets that outgrew their anchor clamp to the new bounds, and positions
//! stranded on ignored content get pushed to the nearest unignored
//! neighbor. Repair is total — when the whole document is gone or empty the
//! result is the null position, and consumers treat null as "operation not
//! applicable" rather than an error.

use horizon_axtree::TreeSource;

use crate::position::{Affinity, PositionKind, TextPosition};

/// Which way a position moves when it has to give up its exact spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentBehavior {
    /// Clamp to the nearest valid position before the stale one.
    MoveBackward,
    /// Clamp to the nearest valid position after the stale one.
    MoveForward,
}

impl TextPosition {
    /// Repairs this position against the current tree.
    ///
    /// The result is always usable: a valid position on unignored content,
    /// or null when the tree is gone or exposes nothing. `behavior` chooses
    /// the preferred repair direction; the opposite direction is the
    /// fallback when the preferred one runs off the document.
    pub fn as_valid_position(
        &self,
        source: &dyn TreeSource,
        behavior: AdjustmentBehavior,
    ) -> TextPosition {
        let repaired = match &self.kind {
            PositionKind::Null => return TextPosition::null(),
            PositionKind::Tree {
                tree,
                anchor,
                child_index,
            } => match source.node(*tree, *anchor) {
                None => return self.clamp_into_tree(source, behavior),
                Some(node) => {
                    let clamped = (*child_index).min(node.child_count());
                    if clamped != *child_index {
                        tracing::trace!(
                            target: crate::targets::NORMALIZE,
                            anchor = %anchor, from = child_index, to = clamped,
                            "clamped child index"
                        );
                    }
                    TextPosition {
                        kind: PositionKind::Tree {
                            tree: *tree,
                            anchor: *anchor,
                            child_index: clamped,
                        },
                    }
                }
            },
            PositionKind::Text {
                tree,
                anchor,
                offset,
                affinity,
            } => match source.node(*tree, *anchor) {
                None => return self.clamp_into_tree(source, behavior),
                Some(node) => {
                    let max = node.max_text_offset();
                    let clamped = (*offset).min(max);
                    if clamped != *offset {
                        tracing::trace!(
                            target: crate::targets::NORMALIZE,
                            anchor = %anchor, from = offset, to = clamped,
                            "clamped text offset"
                        );
                    }
                    TextPosition::text_position_unchecked(*tree, *anchor, clamped, *affinity)
                }
            },
        };
        repaired.as_unignored_position(source, behavior)
    }

    /// Pushes a position resting on ignored content to the nearest
    /// unignored position in the preferred direction, falling back to the
    /// opposite direction at document extremes.
    ///
    /// A position whose resolved leaf is already unignored is returned
    /// unchanged (in leaf-resolved form).
    pub fn as_unignored_position(
        &self,
        source: &dyn TreeSource,
        behavior: AdjustmentBehavior,
    ) -> TextPosition {
        let Ok(leaf_pos) = self.as_leaf_text_position(source) else {
            return TextPosition::null();
        };
        let Some(leaf) = leaf_pos.anchor(source) else {
            return leaf_pos; // null passes through
        };
        if !leaf.is_ignored() {
            return leaf_pos;
        }
        tracing::debug!(
            target: crate::targets::NORMALIZE,
            anchor = %leaf.id(), ?behavior,
            "repairing position on ignored content"
        );
        let backward = || {
            leaf.previous_unignored_leaf().map(|prev| {
                TextPosition::text_position_unchecked(
                    prev.tree_id(),
                    prev.id(),
                    prev.text_utf16().len(),
                    Affinity::Downstream,
                )
            })
        };
        let forward = || {
            leaf.next_unignored_leaf().map(|next| {
                TextPosition::text_position_unchecked(
                    next.tree_id(),
                    next.id(),
                    0,
                    Affinity::Downstream,
                )
            })
        };
        let repaired = match behavior {
            AdjustmentBehavior::MoveBackward => backward().or_else(forward),
            AdjustmentBehavior::MoveForward => forward().or_else(backward),
        };
        repaired.unwrap_or_else(TextPosition::null)
    }

    /// Last-resort repair when the anchor itself is gone: clamp to the end
    /// of whatever survives of the tree the position lived in.
    ///
    /// With the anchor removed there is nothing to measure the old location
    /// against, and the common cause is the document shrinking past the
    /// position, so the new last valid position is the closest stand-in.
    /// Repairing forward finds nothing beyond it and falls back to the same
    /// place.
    fn clamp_into_tree(
        &self,
        source: &dyn TreeSource,
        behavior: AdjustmentBehavior,
    ) -> TextPosition {
        let Some(tree_id) = self.tree_id() else {
            return TextPosition::null();
        };
        let Some(root) = source.tree(tree_id).and_then(|tree| tree.root_id()) else {
            return TextPosition::null();
        };
        tracing::debug!(
            target: crate::targets::NORMALIZE,
            tree = %tree_id, ?behavior,
            "anchor removed, clamping into surviving tree"
        );
        let entry = TextPosition::text_position_unchecked(tree_id, root, 0, Affinity::Downstream);
        entry
            .create_position_at_document_end(source)
            .as_unignored_position(source, behavior)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_axtree::{NodeData, NodeId, Role, Tree, TreeId};

    fn text(id: u64, content: &str) -> NodeData {
        NodeData::new(NodeId::new(id), Role::StaticText).with_text(content)
    }

    fn three_leaf_tree() -> Tree {
        let mut tree = Tree::new(TreeId::new(1));
        tree.set_root(NodeData::new(NodeId::new(1), Role::Document)).unwrap();
        tree.push_child(NodeId::new(1), text(2, "alpha ")).unwrap();
        tree.push_child(NodeId::new(1), text(3, "beta ")).unwrap();
        tree.push_child(NodeId::new(1), text(4, "gamma")).unwrap();
        tree
    }

    #[test]
    fn test_valid_position_passes_through() {
        let tree = three_leaf_tree();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(3),
            2,
            Affinity::Downstream,
        );
        let repaired = pos.as_valid_position(&tree, AdjustmentBehavior::MoveBackward);
        assert_eq!(repaired.anchor_id(), Some(NodeId::new(3)));
        assert_eq!(repaired.text_offset(), Some(2));
    }

    #[test]
    fn test_offset_clamped_after_text_shrinks() {
        let mut tree = three_leaf_tree();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(3),
            5,
            Affinity::Downstream,
        );
        tree.set_text(NodeId::new(3), "b").unwrap();

        let repaired = pos.as_valid_position(&tree, AdjustmentBehavior::MoveBackward);
        assert!(repaired.is_valid(&tree));
        assert_eq!(repaired.anchor_id(), Some(NodeId::new(3)));
        assert_eq!(repaired.text_offset(), Some(1));
    }

    #[test]
    fn test_removed_anchor_clamps_to_document_end() {
        let mut tree = three_leaf_tree();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(4),
            3,
            Affinity::Downstream,
        );
        tree.remove_subtree(NodeId::new(4)).unwrap();

        let repaired = pos.as_valid_position(&tree, AdjustmentBehavior::MoveBackward);
        assert_eq!(repaired.anchor_id(), Some(NodeId::new(3)));
        assert_eq!(repaired.text_offset(), Some(5));
        assert!(repaired.at_end_of_document(&tree));
    }

    #[test]
    fn test_ignored_anchor_pushed_backward_then_forward() {
        let mut tree = three_leaf_tree();
        tree.set_ignored(NodeId::new(3), true).unwrap();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(3),
            2,
            Affinity::Downstream,
        );

        let back = pos.as_valid_position(&tree, AdjustmentBehavior::MoveBackward);
        assert_eq!(back.anchor_id(), Some(NodeId::new(2)));
        assert_eq!(back.text_offset(), Some(6));

        let forward = pos.as_valid_position(&tree, AdjustmentBehavior::MoveForward);
        assert_eq!(forward.anchor_id(), Some(NodeId::new(4)));
        assert_eq!(forward.text_offset(), Some(0));
    }

    #[test]
    fn test_direction_fallback_at_document_edge() {
        let mut tree = three_leaf_tree();
        tree.set_ignored(NodeId::new(2), true).unwrap();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(2),
            0,
            Affinity::Downstream,
        );

        // Nothing unignored precedes node 2, so backward falls back to
        // moving forward.
        let repaired = pos.as_valid_position(&tree, AdjustmentBehavior::MoveBackward);
        assert_eq!(repaired.anchor_id(), Some(NodeId::new(3)));
        assert_eq!(repaired.text_offset(), Some(0));
    }

    #[test]
    fn test_empty_tree_yields_null() {
        let mut tree = three_leaf_tree();
        let pos = TextPosition::text_position(
            &tree,
            TreeId::new(1),
            NodeId::new(3),
            2,
            Affinity::Downstream,
        );
        tree.remove_subtree(NodeId::new(1)).unwrap();

        let repaired = pos.as_valid_position(&tree, AdjustmentBehavior::MoveBackward);
        assert!(repaired.is_null());
    }

    #[test]
    fn test_tree_position_child_index_clamped() {
        let mut tree = three_leaf_tree();
        let pos = TextPosition::tree_position(&tree, TreeId::new(1), NodeId::new(1), 3);
        tree.remove_subtree(NodeId::new(4)).unwrap();

        let repaired = pos.as_valid_position(&tree, AdjustmentBehavior::MoveBackward);
        assert!(repaired.is_valid(&tree));
    }
}
