//! Unit boundary computation and position movement.
//!
//! Every navigation unit defines two things: a predicate (is this position
//! at a start/end boundary of the unit?) and a directional search (where is
//! the nearest such boundary?). Word and line boundaries come from offset
//! lists on leaf nodes; paragraph, page, and format boundaries are
//! structural, derived from roles, line/page-breaking flags, and format
//! attribute changes between adjacent leaves.
//!
//! Searches are total: running out of document is reported as `Ok(None)`,
//! which movement loops translate into a zero-distance move, never an
//! error. All movement is UTF-16 surrogate-pair aware — a position can
//! never come to rest between a high and a low surrogate.

use horizon_axtree::{BoolAttr, FloatAttr, IntAttr, IntListAttr, NodeRef, StrAttr, TreeSource};

use crate::error::Result;
use crate::position::{Affinity, PositionKind, TextPosition};

/// A semantic granularity for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextUnit {
    /// One UTF-16 code point (surrogate pairs move as one).
    Character,
    /// A run of identically formatted text.
    Format,
    /// A word, per the leaf word boundary lists.
    Word,
    /// A visual line, per the leaf line boundary lists.
    Line,
    /// A paragraph, per the block structure of the tree.
    Paragraph,
    /// A page, per page-breaking nodes. A document with no page breaks is
    /// one page.
    Page,
    /// The entire document.
    Document,
}

/// Direction of a boundary search or movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
}

/// Which edge of a unit a boundary search targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryEdge {
    Start,
    End,
}

// =============================================================================
// Structural boundary predicates over leaves
// =============================================================================

fn is_line_breaking(node: &NodeRef<'_>) -> bool {
    node.role().is_block_container()
        || node.role().is_line_break()
        || node.data().bool_attribute(BoolAttr::IsLineBreakingObject) == Some(true)
}

fn is_page_breaking(node: &NodeRef<'_>) -> bool {
    node.role().is_page_break()
        || node.data().bool_attribute(BoolAttr::IsPageBreakingObject) == Some(true)
}

/// The nearest ancestor that forces line breaks around its content.
/// Adjacent leaves with different nearest blocks sit in different
/// paragraphs.
fn nearest_block(leaf: &NodeRef<'_>) -> Option<(horizon_axtree::TreeId, horizon_axtree::NodeId)> {
    let mut current = leaf.parent();
    while let Some(node) = current {
        if is_line_breaking(&node) {
            return Some((node.tree_id(), node.id()));
        }
        current = node.parent();
    }
    None
}

fn nearest_page(leaf: &NodeRef<'_>) -> Option<(horizon_axtree::TreeId, horizon_axtree::NodeId)> {
    let mut current = leaf.parent();
    while let Some(node) = current {
        if is_page_breaking(&node) {
            return Some((node.tree_id(), node.id()));
        }
        current = node.parent();
    }
    None
}

pub(crate) fn starts_paragraph(leaf: &NodeRef<'_>) -> bool {
    let Some(prev) = leaf.previous_unignored_leaf() else {
        return true;
    };
    // Empty objects stand alone: they open a paragraph themselves and force
    // one open on whatever follows them.
    if leaf.is_empty_object() || prev.is_empty_object() {
        return true;
    }
    if prev.role().is_line_break() {
        return true;
    }
    nearest_block(leaf) != nearest_block(&prev)
}

pub(crate) fn ends_paragraph(leaf: &NodeRef<'_>) -> bool {
    match leaf.next_unignored_leaf() {
        None => true,
        Some(next) => starts_paragraph(&next),
    }
}

fn starts_page(leaf: &NodeRef<'_>) -> bool {
    let Some(prev) = leaf.previous_unignored_leaf() else {
        return true;
    };
    leaf.role().is_page_break()
        || prev.role().is_page_break()
        || nearest_page(leaf) != nearest_page(&prev)
}

fn ends_page(leaf: &NodeRef<'_>) -> bool {
    match leaf.next_unignored_leaf() {
        None => true,
        Some(next) => starts_page(&next),
    }
}

/// The format attributes that delimit a format run. Attributes missing on
/// the leaf inherit from ancestors.
#[derive(Debug, PartialEq, Eq)]
struct FormatSignature {
    family: Option<String>,
    /// Font size compared exactly, as delivered by the tree owner.
    size_bits: Option<u32>,
    weight: Option<i32>,
    style: Option<i32>,
    foreground: Option<i32>,
    background: Option<i32>,
}

fn format_signature(leaf: &NodeRef<'_>) -> FormatSignature {
    FormatSignature {
        family: leaf
            .inherited_str_attribute(StrAttr::FontFamily)
            .map(str::to_owned),
        size_bits: leaf
            .inherited_float_attribute(FloatAttr::FontSize)
            .map(f32::to_bits),
        weight: leaf.inherited_int_attribute(IntAttr::FontWeight),
        style: leaf.inherited_int_attribute(IntAttr::TextStyle),
        foreground: leaf.inherited_int_attribute(IntAttr::ForegroundColor),
        background: leaf.inherited_int_attribute(IntAttr::BackgroundColor),
    }
}

pub(crate) fn starts_format_run(leaf: &NodeRef<'_>) -> bool {
    let Some(prev) = leaf.previous_unignored_leaf() else {
        return true;
    };
    if leaf.is_empty_object() || prev.is_empty_object() {
        return true;
    }
    format_signature(leaf) != format_signature(&prev)
}

pub(crate) fn ends_format_run(leaf: &NodeRef<'_>) -> bool {
    match leaf.next_unignored_leaf() {
        None => true,
        Some(next) => starts_format_run(&next),
    }
}

// =============================================================================
// Line boundary offsets
// =============================================================================

fn attr_offsets(leaf: &NodeRef<'_>, key: IntListAttr, max: usize) -> Option<Vec<usize>> {
    leaf.data().int_list_attribute(key).map(|values| {
        let mut offsets: Vec<usize> = values
            .iter()
            .filter(|&&v| v >= 0 && (v as usize) <= max)
            .map(|&v| v as usize)
            .collect();
        offsets.sort_unstable();
        offsets.dedup();
        offsets
    })
}

fn leaf_starts_line(leaf: &NodeRef<'_>) -> bool {
    if starts_paragraph(leaf) {
        return true;
    }
    // A wrap recorded at the very start of this leaf.
    attr_offsets(leaf, IntListAttr::LineStarts, leaf.text_utf16().len())
        .is_some_and(|starts| starts.contains(&0))
}

fn leaf_ends_line(leaf: &NodeRef<'_>) -> bool {
    leaf.role().is_line_break()
        || match leaf.next_unignored_leaf() {
            None => true,
            Some(next) => leaf_starts_line(&next),
        }
}

/// Offsets within `leaf` at which lines start.
fn line_start_offsets(leaf: &NodeRef<'_>) -> Vec<usize> {
    let max = leaf.text_utf16().len();
    let mut starts = attr_offsets(leaf, IntListAttr::LineStarts, max).unwrap_or_default();
    if leaf_starts_line(leaf) && !starts.contains(&0) {
        starts.insert(0, 0);
    }
    starts
}

/// Offsets within `leaf` at which lines end. Without an explicit `LineEnds`
/// list, every recorded wrap start doubles as the previous line's end, and
/// the leaf's end closes a line when the next leaf opens one.
fn line_end_offsets(leaf: &NodeRef<'_>) -> Vec<usize> {
    let max = leaf.text_utf16().len();
    if let Some(ends) = attr_offsets(leaf, IntListAttr::LineEnds, max) {
        return ends;
    }
    let mut ends: Vec<usize> = attr_offsets(leaf, IntListAttr::LineStarts, max)
        .unwrap_or_default()
        .into_iter()
        .filter(|&offset| offset > 0)
        .collect();
    if leaf_ends_line(leaf) && !ends.contains(&max) {
        ends.push(max);
    }
    ends
}

/// All boundary offsets of `unit` within one leaf, ascending.
fn leaf_boundary_offsets(leaf: &NodeRef<'_>, unit: TextUnit, edge: BoundaryEdge) -> Vec<usize> {
    let max = leaf.text_utf16().len();
    match (unit, edge) {
        (TextUnit::Character, _) => (0..=max).collect(),
        (TextUnit::Word, BoundaryEdge::Start) => leaf.word_starts(),
        (TextUnit::Word, BoundaryEdge::End) => leaf.word_ends(),
        (TextUnit::Line, BoundaryEdge::Start) => line_start_offsets(leaf),
        (TextUnit::Line, BoundaryEdge::End) => line_end_offsets(leaf),
        (TextUnit::Paragraph, BoundaryEdge::Start) => {
            if starts_paragraph(leaf) { vec![0] } else { Vec::new() }
        }
        (TextUnit::Paragraph, BoundaryEdge::End) => {
            if ends_paragraph(leaf) { vec![max] } else { Vec::new() }
        }
        (TextUnit::Page, BoundaryEdge::Start) => {
            if starts_page(leaf) { vec![0] } else { Vec::new() }
        }
        (TextUnit::Page, BoundaryEdge::End) => {
            if ends_page(leaf) { vec![max] } else { Vec::new() }
        }
        (TextUnit::Format, BoundaryEdge::Start) => {
            if starts_format_run(leaf) { vec![0] } else { Vec::new() }
        }
        (TextUnit::Format, BoundaryEdge::End) => {
            if ends_format_run(leaf) { vec![max] } else { Vec::new() }
        }
        (TextUnit::Document, BoundaryEdge::Start) => {
            if leaf.previous_unignored_leaf().is_none() { vec![0] } else { Vec::new() }
        }
        (TextUnit::Document, BoundaryEdge::End) => {
            if leaf.next_unignored_leaf().is_none() { vec![max] } else { Vec::new() }
        }
    }
}

// =============================================================================
// Surrogate handling
// =============================================================================

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

/// Whether `offset` splits a surrogate pair in `text`.
fn splits_surrogate_pair(text: &[u16], offset: usize) -> bool {
    offset > 0
        && offset < text.len()
        && is_high_surrogate(text[offset - 1])
        && is_low_surrogate(text[offset])
}

impl TextPosition {
    // =========================================================================
    // Document extremes
    // =========================================================================

    /// A position at the very start of this position's document.
    ///
    /// Anchored on the first unignored text leaf, or on the document root
    /// itself when the document exposes no text. Null in, null out.
    pub fn create_position_at_document_start(&self, source: &dyn TreeSource) -> TextPosition {
        let Some(root) = self.document_root(source) else {
            return TextPosition::null();
        };
        let anchor = first_text_leaf(&root).unwrap_or(root);
        TextPosition::text_position_unchecked(
            anchor.tree_id(),
            anchor.id(),
            0,
            Affinity::Downstream,
        )
    }

    /// A position at the very end of this position's document.
    pub fn create_position_at_document_end(&self, source: &dyn TreeSource) -> TextPosition {
        let Some(root) = self.document_root(source) else {
            return TextPosition::null();
        };
        let anchor = last_text_leaf(&root).unwrap_or(root);
        let offset = anchor.max_text_offset();
        TextPosition::text_position_unchecked(
            anchor.tree_id(),
            anchor.id(),
            offset,
            Affinity::Downstream,
        )
    }

    /// Re-anchors a leaf position resting at the end of its leaf onto the
    /// start of the following text leaf, when one exists.
    ///
    /// The two positions are the same place in the document; navigation
    /// forward prefers the downstream anchor so that boundary tests see the
    /// content about to be traversed.
    pub(crate) fn forward_normalized(&self, source: &dyn TreeSource) -> Result<TextPosition> {
        let leaf_pos = self.as_leaf_text_position(source)?;
        let PositionKind::Text { offset, affinity, .. } = leaf_pos.kind else {
            return Ok(leaf_pos);
        };
        let Some(leaf) = leaf_pos.anchor(source) else {
            return Ok(leaf_pos);
        };
        if offset == leaf.max_text_offset() {
            if let Some(next) = leaf.next_unignored_leaf() {
                return Ok(TextPosition::text_position_unchecked(
                    next.tree_id(),
                    next.id(),
                    0,
                    affinity,
                ));
            }
        }
        Ok(leaf_pos)
    }

    // =========================================================================
    // Character movement
    // =========================================================================

    /// The position one character forward, or `Ok(None)` at the document
    /// end. Surrogate pairs are crossed in one step.
    pub fn create_next_character_position(
        &self,
        source: &dyn TreeSource,
    ) -> Result<Option<TextPosition>> {
        if self.is_null() {
            return Ok(None);
        }
        let leaf_pos = self.forward_normalized(source)?;
        let PositionKind::Text { offset, .. } = leaf_pos.kind else {
            return Ok(None);
        };
        let Some(leaf) = leaf_pos.anchor(source) else {
            return Ok(None);
        };
        let text = leaf.text_utf16();
        if offset >= text.len() {
            // End of the last leaf in the document.
            return Ok(None);
        }
        let mut next = offset + 1;
        if splits_surrogate_pair(&text, next) {
            next += 1;
        }
        Ok(Some(TextPosition::text_position_unchecked(
            leaf.tree_id(),
            leaf.id(),
            next,
            Affinity::Downstream,
        )))
    }

    /// The position one character backward, or `Ok(None)` at the document
    /// start.
    pub fn create_previous_character_position(
        &self,
        source: &dyn TreeSource,
    ) -> Result<Option<TextPosition>> {
        if self.is_null() {
            return Ok(None);
        }
        let leaf_pos = self.as_leaf_text_position(source)?;
        let PositionKind::Text { offset, .. } = leaf_pos.kind else {
            return Ok(None);
        };
        let Some(leaf) = leaf_pos.anchor(source) else {
            return Ok(None);
        };
        if offset == 0 {
            // Cross into the previous leaf and step back from its end.
            let Some(prev) = leaf.previous_unignored_leaf() else {
                return Ok(None);
            };
            let end = TextPosition::text_position_unchecked(
                prev.tree_id(),
                prev.id(),
                prev.text_utf16().len(),
                Affinity::Downstream,
            );
            return end.create_previous_character_position(source);
        }
        let text = leaf.text_utf16();
        let mut prev_offset = offset - 1;
        if splits_surrogate_pair(&text, prev_offset) {
            prev_offset -= 1;
        }
        Ok(Some(TextPosition::text_position_unchecked(
            leaf.tree_id(),
            leaf.id(),
            prev_offset,
            Affinity::Downstream,
        )))
    }

    // =========================================================================
    // Generic boundary search
    // =========================================================================

    /// Whether this position sits on a `unit` boundary of the given edge.
    ///
    /// Boundary positions between adjacent leaves are equivalent: the end
    /// of one leaf tests positive for a boundary recorded at offset zero of
    /// the next, and vice versa.
    pub fn at_boundary(
        &self,
        source: &dyn TreeSource,
        unit: TextUnit,
        edge: BoundaryEdge,
    ) -> Result<bool> {
        if self.is_null() {
            return Ok(false);
        }
        match (unit, edge) {
            (TextUnit::Character, _) => {
                let leaf_pos = self.as_leaf_text_position(source)?;
                let PositionKind::Text { offset, .. } = leaf_pos.kind else {
                    return Ok(false);
                };
                let Some(leaf) = leaf_pos.anchor(source) else {
                    return Ok(false);
                };
                Ok(!splits_surrogate_pair(&leaf.text_utf16(), offset))
            }
            (TextUnit::Document, BoundaryEdge::Start) => Ok(self.at_start_of_document(source)),
            (TextUnit::Document, BoundaryEdge::End) => Ok(self.at_end_of_document(source)),
            _ => {
                let leaf_pos = self.as_leaf_text_position(source)?;
                let PositionKind::Text { offset, .. } = leaf_pos.kind else {
                    return Ok(false);
                };
                let Some(leaf) = leaf_pos.anchor(source) else {
                    return Ok(false);
                };
                if leaf_boundary_offsets(&leaf, unit, edge).contains(&offset) {
                    return Ok(true);
                }
                // Equivalent position on the next leaf.
                if offset == leaf.max_text_offset() {
                    if let Some(next) = leaf.next_unignored_leaf() {
                        if leaf_boundary_offsets(&next, unit, edge).contains(&0) {
                            return Ok(true);
                        }
                    }
                }
                // Equivalent position on the previous leaf.
                if offset == 0 {
                    if let Some(prev) = leaf.previous_unignored_leaf() {
                        let prev_max = prev.text_utf16().len();
                        if leaf_boundary_offsets(&prev, unit, edge).contains(&prev_max) {
                            return Ok(true);
                        }
                    }
                }
                Ok(false)
            }
        }
    }

    /// The nearest `unit` boundary of the given edge, strictly beyond this
    /// position in `direction`. `Ok(None)` means the document edge was
    /// reached with no further boundary — callers report that as a
    /// zero-distance move.
    pub fn create_boundary_position(
        &self,
        source: &dyn TreeSource,
        unit: TextUnit,
        edge: BoundaryEdge,
        direction: MoveDirection,
    ) -> Result<Option<TextPosition>> {
        if self.is_null() {
            return Ok(None);
        }
        if unit == TextUnit::Character {
            return match direction {
                MoveDirection::Forward => self.create_next_character_position(source),
                MoveDirection::Backward => self.create_previous_character_position(source),
            };
        }
        if unit == TextUnit::Document {
            let target = match direction {
                MoveDirection::Forward if !self.at_end_of_document(source) => {
                    self.create_position_at_document_end(source)
                }
                MoveDirection::Backward if !self.at_start_of_document(source) => {
                    self.create_position_at_document_start(source)
                }
                _ => return Ok(None),
            };
            return Ok((!target.is_null()).then_some(target));
        }

        let leaf_pos = self.as_leaf_text_position(source)?;
        let PositionKind::Text { offset, .. } = leaf_pos.kind else {
            return Ok(None);
        };
        let Some(leaf) = leaf_pos.anchor(source) else {
            return Ok(None);
        };
        let affinity = boundary_affinity(unit, edge);

        match direction {
            MoveDirection::Forward => {
                if let Some(&found) = leaf_boundary_offsets(&leaf, unit, edge)
                    .iter()
                    .find(|&&o| o > offset)
                {
                    return Ok(Some(TextPosition::text_position_unchecked(
                        leaf.tree_id(),
                        leaf.id(),
                        found,
                        affinity,
                    )));
                }
                let at_leaf_end = offset == leaf.max_text_offset();
                let mut first_hop = true;
                let mut current = leaf;
                while let Some(next) = current.next_unignored_leaf() {
                    let candidate = leaf_boundary_offsets(&next, unit, edge)
                        .into_iter()
                        // Offset 0 of the adjacent leaf is the same place as
                        // the end of the leaf we started on.
                        .find(|&o| !(first_hop && at_leaf_end && o == 0));
                    if let Some(found) = candidate {
                        return Ok(Some(TextPosition::text_position_unchecked(
                            next.tree_id(),
                            next.id(),
                            found,
                            affinity,
                        )));
                    }
                    first_hop = false;
                    current = next;
                }
                tracing::trace!(
                    target: crate::targets::BOUNDARY,
                    ?unit, ?edge, "forward search exhausted the document"
                );
                Ok(None)
            }
            MoveDirection::Backward => {
                if let Some(&found) = leaf_boundary_offsets(&leaf, unit, edge)
                    .iter()
                    .rev()
                    .find(|&&o| o < offset)
                {
                    return Ok(Some(TextPosition::text_position_unchecked(
                        leaf.tree_id(),
                        leaf.id(),
                        found,
                        affinity,
                    )));
                }
                let at_leaf_start = offset == 0;
                let mut first_hop = true;
                let mut current = leaf;
                while let Some(prev) = current.previous_unignored_leaf() {
                    let prev_max = prev.text_utf16().len();
                    let candidate = leaf_boundary_offsets(&prev, unit, edge)
                        .into_iter()
                        .rev()
                        .find(|&o| !(first_hop && at_leaf_start && o == prev_max));
                    if let Some(found) = candidate {
                        return Ok(Some(TextPosition::text_position_unchecked(
                            prev.tree_id(),
                            prev.id(),
                            found,
                            affinity,
                        )));
                    }
                    first_hop = false;
                    current = prev;
                }
                tracing::trace!(
                    target: crate::targets::BOUNDARY,
                    ?unit, ?edge, "backward search exhausted the document"
                );
                Ok(None)
            }
        }
    }

    /// One movement step by `unit` in `direction`.
    ///
    /// Character steps by one character; Document jumps to the document
    /// edge; every other unit steps between unit start boundaries, the way
    /// a caret hops words or lines.
    pub(crate) fn step(
        &self,
        source: &dyn TreeSource,
        unit: TextUnit,
        direction: MoveDirection,
    ) -> Result<Option<TextPosition>> {
        self.create_boundary_position(source, unit, BoundaryEdge::Start, direction)
    }

    // =========================================================================
    // Named predicates
    // =========================================================================

    /// Whether this position is at the start of a word.
    pub fn at_start_of_word(&self, source: &dyn TreeSource) -> Result<bool> {
        self.at_boundary(source, TextUnit::Word, BoundaryEdge::Start)
    }

    /// Whether this position is at the end of a word.
    pub fn at_end_of_word(&self, source: &dyn TreeSource) -> Result<bool> {
        self.at_boundary(source, TextUnit::Word, BoundaryEdge::End)
    }

    /// Whether this position is at the start of a line. A position exactly
    /// on a soft wrap belongs to the next line only with downstream
    /// affinity.
    pub fn at_start_of_line(&self, source: &dyn TreeSource) -> Result<bool> {
        if self.affinity() == Some(Affinity::Upstream) {
            let leaf_pos = self.as_leaf_text_position(source)?;
            if let (PositionKind::Text { offset, .. }, Some(leaf)) =
                (&leaf_pos.kind, leaf_pos.anchor(source))
            {
                // Upstream at a wrap binds to the previous line's end.
                if line_end_offsets(&leaf).contains(offset) {
                    return Ok(false);
                }
            }
        }
        self.at_boundary(source, TextUnit::Line, BoundaryEdge::Start)
    }

    /// Whether this position is at the end of a line. A position exactly on
    /// a soft wrap belongs to the previous line only with upstream
    /// affinity.
    pub fn at_end_of_line(&self, source: &dyn TreeSource) -> Result<bool> {
        if self.affinity() == Some(Affinity::Downstream) {
            let leaf_pos = self.as_leaf_text_position(source)?;
            if let (PositionKind::Text { offset, .. }, Some(leaf)) =
                (&leaf_pos.kind, leaf_pos.anchor(source))
            {
                let starts = line_start_offsets(&leaf);
                let ends = line_end_offsets(&leaf);
                // A soft wrap offset is both an end and a start; downstream
                // affinity binds it to the start of the next line.
                if starts.contains(offset) && ends.contains(offset) {
                    return Ok(false);
                }
            }
        }
        self.at_boundary(source, TextUnit::Line, BoundaryEdge::End)
    }

    /// Whether this position is at the start of a paragraph.
    pub fn at_start_of_paragraph(&self, source: &dyn TreeSource) -> Result<bool> {
        self.at_boundary(source, TextUnit::Paragraph, BoundaryEdge::Start)
    }

    /// Whether this position is at the end of a paragraph.
    pub fn at_end_of_paragraph(&self, source: &dyn TreeSource) -> Result<bool> {
        self.at_boundary(source, TextUnit::Paragraph, BoundaryEdge::End)
    }

    /// Whether this position is at the start of a format run.
    pub fn at_start_of_format_run(&self, source: &dyn TreeSource) -> Result<bool> {
        self.at_boundary(source, TextUnit::Format, BoundaryEdge::Start)
    }
}

/// Line-end boundaries bind upstream so a position created at a soft wrap
/// stays on the line it terminates; everything else binds downstream.
fn boundary_affinity(unit: TextUnit, edge: BoundaryEdge) -> Affinity {
    match (unit, edge) {
        (TextUnit::Line, BoundaryEdge::End) => Affinity::Upstream,
        _ => Affinity::Downstream,
    }
}

fn first_text_leaf<'a>(root: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    let mut current = *root;
    while !current.is_leaf() {
        current = current.child_at(0)?;
    }
    if !current.is_ignored() && !current.text_utf16().is_empty() {
        Some(current)
    } else {
        current.next_unignored_leaf()
    }
}

fn last_text_leaf<'a>(root: &NodeRef<'a>) -> Option<NodeRef<'a>> {
    let mut current = *root;
    while !current.is_leaf() {
        let count = current.child_count();
        current = current.child_at(count - 1)?;
    }
    if !current.is_ignored() && !current.text_utf16().is_empty() {
        Some(current)
    } else {
        current.previous_unignored_leaf()
    }
}
