//! Node data and the borrowed node handle.
//!
//! [`NodeData`] is the owned payload stored inside a [`Tree`](crate::Tree):
//! role, text, flags, attributes, and child links. [`NodeRef`] is a cheap
//! borrowed handle that pairs a `NodeData` with the [`TreeSource`] it was
//! resolved from, giving navigation code parent/child traversal that crosses
//! embedded sub-documents and skips ignored content.
//!
//! # Text semantics
//!
//! Node text is stored as UTF-16 code units, because assistive technology
//! offsets are defined in UTF-16. A childless node with an object
//! replacement role (image, button, embedded object, ...) and no text of its
//! own exposes a single U+FFFC code unit so text positions can land on it.

use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;

use crate::attr::{AttrTable, BoolAttr, FloatAttr, IntAttr, IntListAttr, StrAttr};
use crate::ids::{NodeId, TreeId};
use crate::role::Role;
use crate::source::TreeSource;

/// The object replacement character exposed by empty object nodes.
pub const OBJECT_REPLACEMENT_CHAR: u16 = 0xFFFC;

/// An axis-aligned bounding rectangle supplied by the tree owner.
///
/// Treated as opaque per-node data; this crate performs no geometry on it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Owned data for one accessibility node.
#[derive(Debug, Clone, Default)]
pub struct NodeData {
    id: NodeId,
    role: Role,
    /// Exposed text in UTF-16 code units.
    text: Vec<u16>,
    /// Excluded from text and boundary computation when set.
    ignored: bool,
    /// Not rendered; treated like `ignored` for text purposes.
    invisible: bool,
    /// Ordered child ids, document order.
    children: Vec<NodeId>,
    /// A hosted sub-document. A node with a child tree exposes that tree's
    /// root as its only child.
    child_tree: Option<TreeId>,
    bounds: Option<NodeBounds>,
    bool_attrs: AttrTable<BoolAttr, bool>,
    int_attrs: AttrTable<IntAttr, i32>,
    float_attrs: AttrTable<FloatAttr, f32>,
    str_attrs: AttrTable<StrAttr, String>,
    int_list_attrs: AttrTable<IntListAttr, Vec<i32>>,
}

impl NodeData {
    /// Creates node data with the given id and role.
    pub fn new(id: NodeId, role: Role) -> Self {
        Self {
            id,
            role,
            ..Default::default()
        }
    }

    /// Builder-style text assignment.
    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Builder-style ignored flag.
    pub fn with_ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Returns this node's id.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns this node's role.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Sets this node's role.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Returns the node's own text as UTF-16 code units.
    ///
    /// This is the raw stored buffer; use [`NodeRef::text_utf16`] for the
    /// exposed text, which substitutes U+FFFC for empty objects.
    #[inline]
    pub fn text(&self) -> &[u16] {
        &self.text
    }

    /// Replaces the node's text.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.encode_utf16().collect();
    }

    /// Whether the node is excluded from text and boundary computation.
    ///
    /// Ignored and invisible nodes are both excluded. The flags are
    /// independent of the node's descendants: an ignored container may still
    /// contain unignored text leaves, and those remain exposed.
    #[inline]
    pub fn is_ignored(&self) -> bool {
        self.ignored || self.invisible
    }

    /// Sets the ignored flag.
    pub fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored;
    }

    /// Whether the node is invisible.
    #[inline]
    pub fn is_invisible(&self) -> bool {
        self.invisible
    }

    /// Sets the invisible flag.
    pub fn set_invisible(&mut self, invisible: bool) {
        self.invisible = invisible;
    }

    /// Ordered child ids.
    #[inline]
    pub fn child_ids(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn child_ids_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }

    /// The hosted sub-document, if any.
    #[inline]
    pub fn child_tree(&self) -> Option<TreeId> {
        self.child_tree
    }

    /// Sets the hosted sub-document link.
    pub fn set_child_tree(&mut self, tree: Option<TreeId>) {
        self.child_tree = tree;
    }

    /// The bounding rectangle supplied by the tree owner.
    #[inline]
    pub fn bounds(&self) -> Option<NodeBounds> {
        self.bounds
    }

    /// Sets the bounding rectangle.
    pub fn set_bounds(&mut self, bounds: Option<NodeBounds>) {
        self.bounds = bounds;
    }

    // =========================================================================
    // Attribute accessors
    // =========================================================================

    /// Looks up a boolean attribute.
    pub fn bool_attribute(&self, key: BoolAttr) -> Option<bool> {
        self.bool_attrs.get(key).copied()
    }

    /// Sets a boolean attribute.
    pub fn set_bool_attribute(&mut self, key: BoolAttr, value: bool) {
        self.bool_attrs.set(key, value);
    }

    /// Looks up an integer attribute.
    pub fn int_attribute(&self, key: IntAttr) -> Option<i32> {
        self.int_attrs.get(key).copied()
    }

    /// Sets an integer attribute.
    pub fn set_int_attribute(&mut self, key: IntAttr, value: i32) {
        self.int_attrs.set(key, value);
    }

    /// Looks up a float attribute.
    pub fn float_attribute(&self, key: FloatAttr) -> Option<f32> {
        self.float_attrs.get(key).copied()
    }

    /// Sets a float attribute.
    pub fn set_float_attribute(&mut self, key: FloatAttr, value: f32) {
        self.float_attrs.set(key, value);
    }

    /// Looks up a string attribute.
    pub fn str_attribute(&self, key: StrAttr) -> Option<&str> {
        self.str_attrs.get(key).map(String::as_str)
    }

    /// Sets a string attribute.
    pub fn set_str_attribute(&mut self, key: StrAttr, value: impl Into<String>) {
        self.str_attrs.set(key, value.into());
    }

    /// Looks up an integer-list attribute.
    pub fn int_list_attribute(&self, key: IntListAttr) -> Option<&[i32]> {
        self.int_list_attrs.get(key).map(Vec::as_slice)
    }

    /// Sets an integer-list attribute.
    pub fn set_int_list_attribute(&mut self, key: IntListAttr, value: Vec<i32>) {
        self.int_list_attrs.set(key, value);
    }
}

/// A borrowed handle to a node, resolved against a [`TreeSource`].
///
/// `NodeRef` is `Copy` and holds no ownership: it is valid for as long as
/// the borrow of the source it was resolved from. Traversal methods cross
/// embedded sub-documents transparently, following `child_tree` links
/// downward and tree host links upward.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    source: &'a dyn TreeSource,
    tree_id: TreeId,
    data: &'a NodeData,
}

impl<'a> NodeRef<'a> {
    /// Resolves `(tree, node)` against `source`.
    pub fn resolve(
        source: &'a dyn TreeSource,
        tree: TreeId,
        node: NodeId,
    ) -> Option<NodeRef<'a>> {
        let data = source.tree(tree)?.node_data(node)?;
        Some(NodeRef {
            source,
            tree_id: tree,
            data,
        })
    }

    /// The source this handle resolves through.
    #[inline]
    pub fn source(&self) -> &'a dyn TreeSource {
        self.source
    }

    /// The id of the tree this node belongs to.
    #[inline]
    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    /// This node's id.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.data.id()
    }

    /// The underlying node data.
    #[inline]
    pub fn data(&self) -> &'a NodeData {
        self.data
    }

    /// This node's role.
    #[inline]
    pub fn role(&self) -> Role {
        self.data.role()
    }

    /// Whether this node is excluded from text and boundary computation.
    #[inline]
    pub fn is_ignored(&self) -> bool {
        self.data.is_ignored()
    }

    /// Two handles are the same node when tree and node ids match.
    pub fn same_node(&self, other: &NodeRef<'_>) -> bool {
        self.tree_id == other.tree_id && self.id() == other.id()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Number of children, counting a hosted sub-document root as one child.
    pub fn child_count(&self) -> usize {
        if let Some(child_tree) = self.data.child_tree() {
            match self.source.tree(child_tree).and_then(|t| t.root_id()) {
                Some(_) => 1,
                None => 0,
            }
        } else {
            self.data.child_ids().len()
        }
    }

    /// The child at `index`, crossing into a hosted sub-document.
    pub fn child_at(&self, index: usize) -> Option<NodeRef<'a>> {
        if let Some(child_tree) = self.data.child_tree() {
            if index != 0 {
                return None;
            }
            let root = self.source.tree(child_tree)?.root_id()?;
            return NodeRef::resolve(self.source, child_tree, root);
        }
        let id = *self.data.child_ids().get(index)?;
        NodeRef::resolve(self.source, self.tree_id, id)
    }

    /// The parent node, crossing from a sub-document root to its host.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        if let Some(parent) = self.source.tree(self.tree_id)?.parent_of(self.id()) {
            return NodeRef::resolve(self.source, self.tree_id, parent);
        }
        // Root of this tree: ascend to the hosting node, if any.
        let (host_tree, host_node) = self.source.tree(self.tree_id)?.host()?;
        NodeRef::resolve(self.source, host_tree, host_node)
    }

    /// This node's index within its parent's children.
    ///
    /// Returns `None` for a document root with no host.
    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent()?;
        if parent.data.child_tree().is_some() {
            return Some(0);
        }
        parent.data.child_ids().iter().position(|&id| id == self.id())
    }

    fn next_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        parent.child_at(self.index_in_parent()? + 1)
    }

    fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        let index = self.index_in_parent()?;
        if index == 0 {
            return None;
        }
        parent.child_at(index - 1)
    }

    // =========================================================================
    // Text exposure
    // =========================================================================

    /// Whether navigation treats this node as a leaf.
    ///
    /// Structural leaves (no children, no hosted tree) are leaves; so are
    /// empty objects, whose (ignored) children are never descended into.
    pub fn is_leaf(&self) -> bool {
        self.is_empty_object() || self.child_count() == 0
    }

    /// Whether this node stands in for content with no text of its own.
    ///
    /// An unignored node with an object replacement role whose subtree
    /// exposes no text. Such nodes expose U+FFFC and always form their own
    /// paragraph and format boundaries.
    pub fn is_empty_object(&self) -> bool {
        !self.is_ignored()
            && self.role().is_object_replacement()
            && self.data.text().is_empty()
            && !self.subtree_exposes_text()
    }

    fn subtree_exposes_text(&self) -> bool {
        (0..self.child_count()).any(|i| {
            let Some(child) = self.child_at(i) else {
                return false;
            };
            if child.child_count() == 0 {
                !child.is_ignored() && !child.data.text().is_empty()
            } else {
                child.subtree_exposes_text()
            }
        })
    }

    /// The text this node exposes directly, substituting U+FFFC for empty
    /// objects.
    ///
    /// Only meaningful for leaves; interior nodes expose the concatenation
    /// of their leaves' text, which callers assemble via leaf iteration.
    pub fn text_utf16(&self) -> Cow<'a, [u16]> {
        if self.is_empty_object() {
            Cow::Owned(vec![OBJECT_REPLACEMENT_CHAR])
        } else {
            Cow::Borrowed(self.data.text())
        }
    }

    /// Total exposed text length of this node in UTF-16 code units.
    ///
    /// For a leaf this is its own exposed text length; for an interior node
    /// it is the sum over unignored leaf descendants, traversing through
    /// ignored interiors to reach unignored leaves beneath them.
    pub fn max_text_offset(&self) -> usize {
        if self.is_leaf() {
            if self.is_ignored() {
                0
            } else {
                self.text_utf16().len()
            }
        } else {
            (0..self.child_count())
                .filter_map(|i| self.child_at(i))
                .map(|child| child.max_text_offset())
                .sum()
        }
    }

    /// Looks up an attribute on this node or the nearest ancestor defining
    /// it. Format attributes inherit down the tree this way.
    pub fn inherited_str_attribute(&self, key: StrAttr) -> Option<&'a str> {
        let mut current = Some(*self);
        while let Some(node) = current {
            if let Some(value) = node.data.str_attribute(key) {
                return Some(value);
            }
            current = node.parent();
        }
        None
    }

    /// Inherited lookup for integer attributes.
    pub fn inherited_int_attribute(&self, key: IntAttr) -> Option<i32> {
        let mut current = Some(*self);
        while let Some(node) = current {
            if let Some(value) = node.data.int_attribute(key) {
                return Some(value);
            }
            current = node.parent();
        }
        None
    }

    /// Inherited lookup for float attributes.
    pub fn inherited_float_attribute(&self, key: FloatAttr) -> Option<f32> {
        let mut current = Some(*self);
        while let Some(node) = current {
            if let Some(value) = node.data.float_attribute(key) {
                return Some(value);
            }
            current = node.parent();
        }
        None
    }

    /// Inherited lookup for boolean attributes.
    pub fn inherited_bool_attribute(&self, key: BoolAttr) -> Option<bool> {
        let mut current = Some(*self);
        while let Some(node) = current {
            if let Some(value) = node.data.bool_attribute(key) {
                return Some(value);
            }
            current = node.parent();
        }
        None
    }

    // =========================================================================
    // Leaf iteration
    // =========================================================================

    fn first_leaf_descendant(&self) -> Option<NodeRef<'a>> {
        let mut current = *self;
        while !current.is_leaf() {
            current = current.child_at(0)?;
        }
        Some(current)
    }

    fn last_leaf_descendant(&self) -> Option<NodeRef<'a>> {
        let mut current = *self;
        while !current.is_leaf() {
            let count = current.child_count();
            current = current.child_at(count - 1)?;
        }
        Some(current)
    }

    /// The next subtree in pre-order that is not a descendant of this node.
    fn next_subtree(&self) -> Option<NodeRef<'a>> {
        let mut current = *self;
        loop {
            if let Some(sibling) = current.next_sibling() {
                return Some(sibling);
            }
            current = current.parent()?;
        }
    }

    fn previous_subtree(&self) -> Option<NodeRef<'a>> {
        let mut current = *self;
        loop {
            if let Some(sibling) = current.previous_sibling() {
                return Some(sibling);
            }
            current = current.parent()?;
        }
    }

    /// The next leaf in pre-order, crossing node and tree boundaries.
    pub fn next_leaf(&self) -> Option<NodeRef<'a>> {
        if self.is_leaf() {
            self.next_subtree()?.first_leaf_descendant()
        } else {
            self.child_at(0)?.first_leaf_descendant()
        }
    }

    /// The previous leaf in reverse pre-order.
    pub fn previous_leaf(&self) -> Option<NodeRef<'a>> {
        self.previous_subtree()?.last_leaf_descendant()
    }

    /// The next unignored leaf that exposes text.
    ///
    /// Ignored leaves and leaves with no exposed text are skipped; whole
    /// ignored subtrees are never textual, but ignored interiors are
    /// traversed to reach unignored leaves beneath them.
    pub fn next_unignored_leaf(&self) -> Option<NodeRef<'a>> {
        let mut current = self.next_leaf()?;
        loop {
            if !current.is_ignored() && !current.text_utf16().is_empty() {
                return Some(current);
            }
            current = current.next_leaf()?;
        }
    }

    /// The previous unignored leaf that exposes text.
    pub fn previous_unignored_leaf(&self) -> Option<NodeRef<'a>> {
        let mut current = self.previous_leaf()?;
        loop {
            if !current.is_ignored() && !current.text_utf16().is_empty() {
                return Some(current);
            }
            current = current.previous_leaf()?;
        }
    }

    // =========================================================================
    // Word boundaries
    // =========================================================================

    /// Word start offsets in UTF-16 code units.
    ///
    /// Uses the `WordStarts` attribute when the tree owner supplied it,
    /// otherwise derives word boundaries from the exposed text.
    pub fn word_starts(&self) -> Vec<usize> {
        if let Some(starts) = self.data.int_list_attribute(IntListAttr::WordStarts) {
            return starts.iter().filter(|&&v| v >= 0).map(|&v| v as usize).collect();
        }
        self.derived_word_bounds().into_iter().map(|(s, _)| s).collect()
    }

    /// Word end offsets in UTF-16 code units.
    pub fn word_ends(&self) -> Vec<usize> {
        if let Some(ends) = self.data.int_list_attribute(IntListAttr::WordEnds) {
            return ends.iter().filter(|&&v| v >= 0).map(|&v| v as usize).collect();
        }
        self.derived_word_bounds().into_iter().map(|(_, e)| e).collect()
    }

    /// Derives `(start, end)` word offsets from the exposed text.
    fn derived_word_bounds(&self) -> Vec<(usize, usize)> {
        let text = String::from_utf16_lossy(&self.text_utf16());
        let mut bounds = Vec::new();
        for (byte_start, word) in text.unicode_word_indices() {
            let utf16_start = text[..byte_start].encode_utf16().count();
            let utf16_len = word.encode_utf16().count();
            bounds.push((utf16_start, utf16_start + utf16_len));
        }
        bounds
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("tree", &self.tree_id)
            .field("id", &self.id())
            .field("role", &self.role())
            .finish()
    }
}
