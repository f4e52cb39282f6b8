//! End-to-end navigation over small documents: document expansion, cross
//! -node movement, boundary equivalence, and move-count symmetry.

use std::cmp::Ordering;

use horizon_axtext::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn text(id: u64, content: &str) -> NodeData {
    NodeData::new(NodeId::new(id), Role::StaticText).with_text(content)
}

/// Root (id 1) with two text leaves: "some text" (id 2), "more text" (id 3).
fn two_leaf_tree() -> Tree {
    let mut tree = Tree::new(TreeId::new(1));
    tree.set_root(NodeData::new(NodeId::new(1), Role::Document)).unwrap();
    tree.push_child(NodeId::new(1), text(2, "some text")).unwrap();
    tree.push_child(NodeId::new(1), text(3, "more text")).unwrap();
    tree
}

fn pos(tree: &Tree, node: u64, offset: usize) -> TextPosition {
    TextPosition::text_position(tree, tree.id(), NodeId::new(node), offset, Affinity::Downstream)
}

#[test]
fn caret_at_root_expands_to_whole_document() {
    init_tracing();
    let tree = two_leaf_tree();
    let caret = TextRange::caret(&tree, pos(&tree, 1, 0));
    let document = caret.expand_to_enclosing_unit(&tree, TextUnit::Document).unwrap();
    assert_eq!(document.get_text(&tree, None).unwrap(), "some textmore text");
}

#[test]
fn start_endpoint_moves_back_across_nodes() {
    let tree = two_leaf_tree();
    let range = TextRange::new(&tree, pos(&tree, 3, 0), pos(&tree, 3, 9));
    let (moved, count) = range
        .move_endpoint_by_unit(&tree, RangeEndpoint::Start, TextUnit::Character, -1)
        .unwrap();
    assert_eq!(count, -1);
    assert_eq!(moved.start().anchor_id(), Some(NodeId::new(2)));
    assert_eq!(moved.get_text(&tree, None).unwrap(), "tmore text");
}

#[test]
fn adjacent_leaf_boundaries_are_the_same_place() {
    let tree = two_leaf_tree();
    let end_of_first = pos(&tree, 2, 9);
    let start_of_second = pos(&tree, 3, 0);
    assert_eq!(
        end_of_first.compare(&start_of_second, &tree).unwrap(),
        Ordering::Equal
    );

    // Used as a range endpoint against any third position, both produce the
    // same text.
    let third = pos(&tree, 3, 4);
    let via_end = TextRange::new(&tree, end_of_first, third.clone());
    let via_start = TextRange::new(&tree, start_of_second, third);
    assert_eq!(
        via_end.get_text(&tree, None).unwrap(),
        via_start.get_text(&tree, None).unwrap()
    );
}

#[test]
fn move_forward_then_back_returns_to_origin() {
    let tree = two_leaf_tree();
    let origin = TextRange::caret(&tree, pos(&tree, 2, 2));
    let (forward, moved) = origin.move_by_unit(&tree, TextUnit::Character, 7).unwrap();
    assert_eq!(moved, 7);
    let (back, moved_back) = forward.move_by_unit(&tree, TextUnit::Character, -7).unwrap();
    assert_eq!(moved_back, -7);
    assert_eq!(
        back.compare_endpoints(&tree, RangeEndpoint::Start, &origin, RangeEndpoint::Start)
            .unwrap(),
        Ordering::Equal
    );
}

#[test]
fn moved_count_never_exceeds_request() {
    let tree = two_leaf_tree();
    let origin = TextRange::caret(&tree, pos(&tree, 2, 0));
    for request in [1isize, 3, 18, 50] {
        let (_, moved) = origin.move_by_unit(&tree, TextUnit::Character, request).unwrap();
        assert!(moved.unsigned_abs() <= request.unsigned_abs());
    }
    // 18 characters in the document, so at most 18 moves from the start.
    let (_, moved) = origin.move_by_unit(&tree, TextUnit::Character, 50).unwrap();
    assert_eq!(moved, 18);
}

#[test]
fn word_movement_crosses_nodes() {
    let tree = two_leaf_tree();
    let caret = TextRange::caret(&tree, pos(&tree, 2, 0));
    let (at_text, _) = caret.move_by_unit(&tree, TextUnit::Word, 1).unwrap();
    assert_eq!(at_text.start().text_offset(), Some(5));

    let (at_more, _) = at_text.move_by_unit(&tree, TextUnit::Word, 1).unwrap();
    assert_eq!(at_more.start().anchor_id(), Some(NodeId::new(3)));
    assert_eq!(at_more.start().text_offset(), Some(0));

    // Word exhaustion: two more word starts at most ("text" inside node 3).
    let (_, moved) = at_more.move_by_unit(&tree, TextUnit::Word, 10).unwrap();
    assert_eq!(moved, 1);
}

#[test]
fn text_roundtrip_through_find() {
    let tree = two_leaf_tree();
    let original = TextRange::new(&tree, pos(&tree, 2, 5), pos(&tree, 3, 4));
    let needle = original.get_text(&tree, None).unwrap();
    assert_eq!(needle, "textmore");

    let document = TextRange::caret(&tree, pos(&tree, 1, 0))
        .expand_to_enclosing_unit(&tree, TextUnit::Document)
        .unwrap();
    let found = document.find_text(&tree, &needle, false, false).unwrap().unwrap();
    assert_eq!(
        found.compare_endpoints(&tree, RangeEndpoint::Start, &original, RangeEndpoint::Start)
            .unwrap(),
        Ordering::Equal
    );
    assert_eq!(
        found.compare_endpoints(&tree, RangeEndpoint::End, &original, RangeEndpoint::End)
            .unwrap(),
        Ordering::Equal
    );
}

#[test]
fn degenerate_range_invariants() {
    let tree = two_leaf_tree();
    let caret = TextRange::caret(&tree, pos(&tree, 2, 4));
    assert!(caret.is_degenerate(&tree).unwrap());
    assert_eq!(caret.get_text(&tree, None).unwrap(), "");

    // Expansion of a caret yields a non-degenerate unit span.
    let word = caret.expand_to_enclosing_unit(&tree, TextUnit::Word).unwrap();
    assert!(!word.is_degenerate(&tree).unwrap());
    assert_eq!(word.get_text(&tree, None).unwrap(), "some");
}

#[test]
fn ordering_invariant_holds_after_every_operation() {
    let tree = two_leaf_tree();
    let mut range = TextRange::new(&tree, pos(&tree, 2, 3), pos(&tree, 3, 2));
    let operations: Vec<(TextRange, isize)> = vec![
        range.move_by_unit(&tree, TextUnit::Word, 1).unwrap(),
        range
            .move_endpoint_by_unit(&tree, RangeEndpoint::End, TextUnit::Character, -9)
            .unwrap(),
        range
            .move_endpoint_by_unit(&tree, RangeEndpoint::Start, TextUnit::Character, 12)
            .unwrap(),
    ];
    for (result, _) in operations {
        assert_ne!(
            result
                .compare_endpoints(&tree, RangeEndpoint::Start, &result, RangeEndpoint::End)
                .unwrap(),
            Ordering::Greater
        );
        range = result;
    }
}

#[test]
fn paragraph_navigation_over_blocks() {
    let mut tree = Tree::new(TreeId::new(1));
    tree.set_root(NodeData::new(NodeId::new(1), Role::Document)).unwrap();
    tree.push_child(NodeId::new(1), NodeData::new(NodeId::new(2), Role::Paragraph)).unwrap();
    tree.push_child(NodeId::new(2), text(3, "one two")).unwrap();
    tree.push_child(NodeId::new(1), NodeData::new(NodeId::new(4), Role::Paragraph)).unwrap();
    tree.push_child(NodeId::new(4), text(5, "three")).unwrap();

    let caret = TextRange::caret(&tree, pos(&tree, 3, 3));
    let para = caret.expand_to_enclosing_unit(&tree, TextUnit::Paragraph).unwrap();
    assert_eq!(para.get_text(&tree, None).unwrap(), "one two");

    let (next, moved) = caret.move_by_unit(&tree, TextUnit::Paragraph, 1).unwrap();
    assert_eq!(moved, 1);
    assert_eq!(next.start().anchor_id(), Some(NodeId::new(5)));
}

#[test]
fn ignored_content_is_skipped_in_text_and_movement() {
    let mut tree = two_leaf_tree();
    tree.insert_child(NodeId::new(1), 1, text(4, "IGNORED")).unwrap();
    tree.set_ignored(NodeId::new(4), true).unwrap();

    let document = TextRange::caret(&tree, pos(&tree, 1, 0))
        .expand_to_enclosing_unit(&tree, TextUnit::Document)
        .unwrap();
    assert_eq!(document.get_text(&tree, None).unwrap(), "some textmore text");

    // Character movement hops over the ignored leaf.
    let caret = TextRange::caret(&tree, pos(&tree, 2, 9));
    let (next, moved) = caret.move_by_unit(&tree, TextUnit::Character, 1).unwrap();
    assert_eq!(moved, 1);
    assert_eq!(next.start().anchor_id(), Some(NodeId::new(3)));
}

#[test]
fn embedded_document_reads_as_continuous_text() {
    let mut host = Tree::new(TreeId::new(1));
    host.set_root(NodeData::new(NodeId::new(1), Role::Document)).unwrap();
    host.push_child(NodeId::new(1), text(2, "before ")).unwrap();
    host.push_child(NodeId::new(1), NodeData::new(NodeId::new(3), Role::EmbeddedObject)).unwrap();
    host.push_child(NodeId::new(1), text(4, " after")).unwrap();

    let mut inner = Tree::new(TreeId::new(2));
    inner.set_root(NodeData::new(NodeId::new(1), Role::Document)).unwrap();
    inner.push_child(NodeId::new(1), text(2, "inner")).unwrap();

    let mut collection = TreeCollection::new();
    collection.insert(host);
    collection.embed(TreeId::new(1), NodeId::new(3), inner).unwrap();

    let caret = TextRange::caret(
        &collection,
        TextPosition::text_position(
            &collection,
            TreeId::new(1),
            NodeId::new(1),
            0,
            Affinity::Downstream,
        ),
    );
    let document = caret.expand_to_enclosing_unit(&collection, TextUnit::Document).unwrap();
    assert_eq!(document.get_text(&collection, None).unwrap(), "before inner after");

    // Movement crosses into and out of the embedded tree.
    let host_end = TextPosition::text_position(
        &collection,
        TreeId::new(1),
        NodeId::new(2),
        7,
        Affinity::Downstream,
    );
    let (stepped, moved) = TextRange::caret(&collection, host_end)
        .move_by_unit(&collection, TextUnit::Character, 1)
        .unwrap();
    assert_eq!(moved, 1);
    assert_eq!(stepped.start().tree_id(), Some(TreeId::new(2)));
}
