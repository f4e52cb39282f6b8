//! Text ranges: ordered pairs of positions with navigation and queries.
//!
//! A [`TextRange`] is two [`TextPosition`]s plus the tree generation it was
//! created against. Ranges are snapshots: every public operation first
//! revalidates the range against the live source, renormalizing the
//! endpoints if the tree has mutated since the range was built, so a stale
//! range degrades gracefully instead of reading out of bounds.
//!
//! A range whose endpoints are equal is *degenerate* and represents a
//! caret. Construction enforces no ordering — callers may build start > end
//! mid-edit — but every public operation reads the endpoints in document
//! order and every returned range satisfies start ≤ end.

use std::cmp::Ordering;

use horizon_axtree::{
    FloatAttr, IntAttr, NodeRef, StrAttr, TreeSource,
};

use crate::boundary::{BoundaryEdge, MoveDirection, TextUnit};
use crate::error::{Error, Result};
use crate::normalize::AdjustmentBehavior;
use crate::position::{Affinity, TextPosition};

/// Names one endpoint of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEndpoint {
    Start,
    End,
}

/// A text attribute queryable over a range.
///
/// Values missing on a leaf are inherited from its ancestors, so a query
/// sees the computed value the leaf is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeAttribute {
    FontFamily,
    FontSize,
    FontWeight,
    TextStyle,
    ForegroundColor,
    BackgroundColor,
    Language,
}

/// An attribute value for [`TextRange::find_attribute`].
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
}

/// The computed value of `attribute` on a leaf, inherited when absent.
fn leaf_attribute_value(leaf: &NodeRef<'_>, attribute: RangeAttribute) -> Option<AttrValue> {
    match attribute {
        RangeAttribute::FontFamily => leaf
            .inherited_str_attribute(StrAttr::FontFamily)
            .map(|v| AttrValue::Str(v.to_owned())),
        RangeAttribute::Language => leaf
            .inherited_str_attribute(StrAttr::Language)
            .map(|v| AttrValue::Str(v.to_owned())),
        RangeAttribute::FontSize => leaf
            .inherited_float_attribute(FloatAttr::FontSize)
            .map(AttrValue::Float),
        RangeAttribute::FontWeight => leaf
            .inherited_int_attribute(IntAttr::FontWeight)
            .map(AttrValue::Int),
        RangeAttribute::TextStyle => leaf
            .inherited_int_attribute(IntAttr::TextStyle)
            .map(AttrValue::Int),
        RangeAttribute::ForegroundColor => leaf
            .inherited_int_attribute(IntAttr::ForegroundColor)
            .map(AttrValue::Int),
        RangeAttribute::BackgroundColor => leaf
            .inherited_int_attribute(IntAttr::BackgroundColor)
            .map(AttrValue::Int),
    }
}

/// One leaf's contribution to a range: the leaf and the slice of its
/// exposed text that falls inside the range.
struct LeafSlice<'a> {
    leaf: NodeRef<'a>,
    start: usize,
    end: usize,
}

impl LeafSlice<'_> {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// A span of text between two positions in an accessibility document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRange {
    start: TextPosition,
    end: TextPosition,
    /// Generation of the start position's tree when the range was built.
    generation: Option<u64>,
}

impl TextRange {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Creates a range over `[start, end]`.
    ///
    /// No normalization happens here: the endpoints are stored as given,
    /// even out of order, and repaired lazily by the first operation that
    /// needs them.
    pub fn new(source: &dyn TreeSource, start: TextPosition, end: TextPosition) -> Self {
        let generation = start
            .tree_id()
            .or_else(|| end.tree_id())
            .and_then(|tree| source.generation(tree));
        Self {
            start,
            end,
            generation,
        }
    }

    /// A degenerate range (caret) at `position`.
    pub fn caret(source: &dyn TreeSource, position: TextPosition) -> Self {
        Self::new(source, position.clone(), position)
    }

    /// The stored start position.
    #[inline]
    pub fn start(&self) -> &TextPosition {
        &self.start
    }

    /// The stored end position.
    #[inline]
    pub fn end(&self) -> &TextPosition {
        &self.end
    }

    /// Whether both endpoints are null.
    pub fn is_null(&self) -> bool {
        self.start.is_null() && self.end.is_null()
    }

    /// Whether the endpoints denote the same place (a caret).
    pub fn is_degenerate(&self, source: &dyn TreeSource) -> Result<bool> {
        if self.start == self.end {
            return Ok(true);
        }
        if self.start.is_null() || self.end.is_null() {
            return Ok(false);
        }
        Ok(self.start.compare(&self.end, source)? == Ordering::Equal)
    }

    fn with_endpoints(&self, source: &dyn TreeSource, start: TextPosition, end: TextPosition) -> Self {
        Self::new(source, start, end)
    }

    // =========================================================================
    // Revalidation
    // =========================================================================

    /// Brings this range up to date with the live source.
    ///
    /// When the underlying tree generation still matches, the range is
    /// returned as-is; otherwise the endpoints are renormalized per the
    /// validation rules. A range whose tree was torn down entirely yields
    /// `ElementNotAvailable`.
    pub fn revalidated(&self, source: &dyn TreeSource) -> Result<TextRange> {
        if self.is_null() {
            return Ok(self.clone());
        }
        let Some(tree) = self.start.tree_id().or_else(|| self.end.tree_id()) else {
            return Ok(self.clone());
        };
        match source.generation(tree) {
            None => {
                // The range's own tree is gone; if the other endpoint's tree
                // is gone too there is nothing left to repair against.
                let other_tree = self.end.tree_id().filter(|&t| t != tree);
                if other_tree.is_none_or(|t| source.generation(t).is_none()) {
                    return Err(Error::element_not_available(tree));
                }
                self.normalized(source)
            }
            Some(generation) if Some(generation) == self.generation => Ok(self.clone()),
            Some(_) => {
                tracing::debug!(
                    target: crate::targets::RANGE,
                    tree = %tree,
                    "tree mutated since range creation, renormalizing"
                );
                self.normalized(source)
            }
        }
    }

    /// Renormalizes both endpoints against the current tree.
    ///
    /// Degenerate ranges repair both endpoints in the same direction —
    /// forward when the position fell out of bounds, backward when it
    /// landed on ignored content — and always converge on a single anchor.
    /// Non-degenerate ranges shrink inward: the start repairs forward, the
    /// end backward. The result is ordered (start ≤ end) or entirely null
    /// when the document no longer exposes any content.
    pub fn normalized(&self, source: &dyn TreeSource) -> Result<TextRange> {
        let degenerate = self.start == self.end;
        let (start, end) = if degenerate {
            // Ignored-content recovery backs up to the content the caret
            // was after; out-of-bounds recovery tries forward first (and
            // ends up clamped back at the document end when nothing
            // follows).
            let behavior = if self.start.is_ignored(source) {
                AdjustmentBehavior::MoveBackward
            } else if !self.start.is_valid(source) {
                AdjustmentBehavior::MoveForward
            } else {
                AdjustmentBehavior::MoveBackward
            };
            let start = self.start.as_valid_position(source, behavior);
            (start.clone(), start)
        } else {
            (
                self.start.as_valid_position(source, AdjustmentBehavior::MoveForward),
                self.end.as_valid_position(source, AdjustmentBehavior::MoveBackward),
            )
        };
        if start.is_null() || end.is_null() {
            return Ok(Self {
                start: TextPosition::null(),
                end: TextPosition::null(),
                generation: None,
            });
        }
        let (start, end) = match start.compare(&end, source)? {
            Ordering::Greater => (end, start),
            Ordering::Equal if start != end => {
                // A caret must not leave its endpoints on two different,
                // merely equivalent, anchors.
                (start.clone(), start)
            }
            _ => (start, end),
        };
        Ok(self.with_endpoints(source, start, end))
    }

    /// The endpoints in document order.
    fn ordered(&self, source: &dyn TreeSource) -> Result<(TextPosition, TextPosition)> {
        if self.start.is_null() || self.end.is_null() {
            return Ok((self.start.clone(), self.end.clone()));
        }
        Ok(match self.start.compare(&self.end, source)? {
            Ordering::Greater => (self.end.clone(), self.start.clone()),
            _ => (self.start.clone(), self.end.clone()),
        })
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compares one endpoint of this range with one endpoint of another.
    ///
    /// Both ranges are revalidated first. Boundary-equivalent positions on
    /// adjacent leaves compare equal.
    pub fn compare_endpoints(
        &self,
        source: &dyn TreeSource,
        this_endpoint: RangeEndpoint,
        other: &TextRange,
        other_endpoint: RangeEndpoint,
    ) -> Result<Ordering> {
        let this = self.revalidated(source)?;
        let other = other.revalidated(source)?;
        let (this_start, this_end) = this.ordered(source)?;
        let (other_start, other_end) = other.ordered(source)?;
        let a = match this_endpoint {
            RangeEndpoint::Start => this_start,
            RangeEndpoint::End => this_end,
        };
        let b = match other_endpoint {
            RangeEndpoint::Start => other_start,
            RangeEndpoint::End => other_end,
        };
        a.compare(&b, source)
    }

    // =========================================================================
    // Leaf walking
    // =========================================================================

    /// The per-leaf slices covered by `[start, end]`, in document order.
    fn leaf_slices<'a>(
        source: &'a dyn TreeSource,
        start: &TextPosition,
        end: &TextPosition,
    ) -> Result<Vec<LeafSlice<'a>>> {
        if start.is_null() || end.is_null() {
            return Ok(Vec::new());
        }
        let start_leaf = start.forward_normalized(source)?;
        let end_leaf = end.as_leaf_text_position(source)?;
        let (Some(first), Some(last)) = (start_leaf.anchor(source), end_leaf.anchor(source)) else {
            return Ok(Vec::new());
        };
        let so = start_leaf.text_offset().unwrap_or(0);
        let eo = end_leaf.text_offset().unwrap_or(0);

        if first.same_node(&last) {
            return Ok(vec![LeafSlice {
                leaf: first,
                start: so.min(eo),
                end: eo.max(so),
            }]);
        }

        let mut slices = vec![LeafSlice {
            leaf: first,
            start: so,
            end: first.text_utf16().len(),
        }];
        let mut current = first;
        while let Some(next) = current.next_unignored_leaf() {
            if next.same_node(&last) {
                slices.push(LeafSlice {
                    leaf: next,
                    start: 0,
                    end: eo,
                });
                return Ok(slices);
            }
            let len = next.text_utf16().len();
            slices.push(LeafSlice {
                leaf: next,
                start: 0,
                end: len,
            });
            current = next;
        }
        // The end leaf was not ahead of the start leaf; treat as empty.
        Ok(Vec::new())
    }

    // =========================================================================
    // Text extraction
    // =========================================================================

    /// The concatenated text of the range.
    ///
    /// Text is assembled from unignored leaves in document order, sliced by
    /// offset at the boundary leaves. `max_count` caps the result in UTF-16
    /// code units; `None` returns the whole span. Degenerate ranges yield
    /// an empty string.
    pub fn get_text(&self, source: &dyn TreeSource, max_count: Option<usize>) -> Result<String> {
        let range = self.revalidated(source)?;
        if range.is_null() {
            return Ok(String::new());
        }
        let (start, end) = range.ordered(source)?;
        let mut budget = max_count.unwrap_or(usize::MAX);
        let mut units: Vec<u16> = Vec::new();
        for slice in Self::leaf_slices(source, &start, &end)? {
            if budget == 0 {
                break;
            }
            let text = slice.leaf.text_utf16();
            let take = slice.len().min(budget);
            units.extend_from_slice(&text[slice.start..slice.start + take]);
            budget -= take;
        }
        Ok(String::from_utf16_lossy(&units))
    }

    // =========================================================================
    // Movement
    // =========================================================================

    /// Moves the whole range by `count` units, collapsing it to a caret at
    /// the destination.
    ///
    /// Returns the new range and the number of units actually moved, signed
    /// by direction; hitting the document edge stops early, so the
    /// magnitude never exceeds `count`. A zero count only normalizes the
    /// endpoint order.
    pub fn move_by_unit(
        &self,
        source: &dyn TreeSource,
        unit: TextUnit,
        count: isize,
    ) -> Result<(TextRange, isize)> {
        let range = self.revalidated(source)?;
        if range.is_null() {
            return Ok((range, 0));
        }
        let (start, end) = range.ordered(source)?;
        if count == 0 {
            return Ok((range.with_endpoints(source, start, end), 0));
        }
        let direction = if count > 0 {
            MoveDirection::Forward
        } else {
            MoveDirection::Backward
        };
        let (position, moved) = Self::step_many(source, start, unit, direction, count.unsigned_abs())?;
        let signed = if count > 0 { moved as isize } else { -(moved as isize) };
        Ok((range.with_endpoints(source, position.clone(), position), signed))
    }

    /// Moves one endpoint by `count` units.
    ///
    /// If the moved endpoint crosses the other one, the other endpoint is
    /// snapped to the moved endpoint's new place, collapsing the range, so
    /// the caller always gets back start ≤ end. Returns the new range and
    /// the signed count actually moved.
    pub fn move_endpoint_by_unit(
        &self,
        source: &dyn TreeSource,
        endpoint: RangeEndpoint,
        unit: TextUnit,
        count: isize,
    ) -> Result<(TextRange, isize)> {
        let range = self.revalidated(source)?;
        if range.is_null() {
            return Ok((range, 0));
        }
        let (start, end) = range.ordered(source)?;
        if count == 0 {
            return Ok((range.with_endpoints(source, start, end), 0));
        }
        let direction = if count > 0 {
            MoveDirection::Forward
        } else {
            MoveDirection::Backward
        };
        let origin = match endpoint {
            RangeEndpoint::Start => start.clone(),
            RangeEndpoint::End => end.clone(),
        };
        let (moved_pos, moved) =
            Self::step_many(source, origin, unit, direction, count.unsigned_abs())?;
        let signed = if count > 0 { moved as isize } else { -(moved as isize) };

        let (new_start, new_end) = match endpoint {
            RangeEndpoint::Start => {
                if moved_pos.compare(&end, source)? == Ordering::Greater {
                    (moved_pos.clone(), moved_pos)
                } else {
                    (moved_pos, end)
                }
            }
            RangeEndpoint::End => {
                if moved_pos.compare(&start, source)? == Ordering::Less {
                    (moved_pos.clone(), moved_pos)
                } else {
                    (start, moved_pos)
                }
            }
        };
        Ok((range.with_endpoints(source, new_start, new_end), signed))
    }

    /// Sets one endpoint of this range to an endpoint of another range.
    ///
    /// The same collapse contract as
    /// [`move_endpoint_by_unit`](Self::move_endpoint_by_unit) applies when
    /// the copied endpoint would cross the kept one.
    pub fn move_endpoint_by_range(
        &self,
        source: &dyn TreeSource,
        this_endpoint: RangeEndpoint,
        other: &TextRange,
        other_endpoint: RangeEndpoint,
    ) -> Result<TextRange> {
        let range = self.revalidated(source)?;
        let other = other.revalidated(source)?;
        let (other_start, other_end) = other.ordered(source)?;
        let incoming = match other_endpoint {
            RangeEndpoint::Start => other_start,
            RangeEndpoint::End => other_end,
        };
        if range.is_null() || incoming.is_null() {
            return Ok(TextRange::caret(source, incoming));
        }
        let (start, end) = range.ordered(source)?;
        let (new_start, new_end) = match this_endpoint {
            RangeEndpoint::Start => {
                if incoming.compare(&end, source)? == Ordering::Greater {
                    (incoming.clone(), incoming)
                } else {
                    (incoming, end)
                }
            }
            RangeEndpoint::End => {
                if incoming.compare(&start, source)? == Ordering::Less {
                    (incoming.clone(), incoming)
                } else {
                    (start, incoming)
                }
            }
        };
        Ok(range.with_endpoints(source, new_start, new_end))
    }

    fn step_many(
        source: &dyn TreeSource,
        origin: TextPosition,
        unit: TextUnit,
        direction: MoveDirection,
        count: usize,
    ) -> Result<(TextPosition, usize)> {
        let mut position = origin;
        let mut moved = 0;
        while moved < count {
            match position.step(source, unit, direction)? {
                Some(next) => {
                    position = next;
                    moved += 1;
                }
                None => break,
            }
        }
        Ok((position, moved))
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Grows or shrinks the range to exactly the enclosing `unit` span.
    ///
    /// The rule is start-anchored: if the start already sits on a unit
    /// start boundary, that boundary is kept (a boundary shared with the
    /// end of the previous unit counts as the start of the *next* unit, so
    /// a caret before an empty object expands onto the object, never back
    /// onto the previous unit); otherwise the start moves backward to the
    /// nearest unit start, falling forward only when no unit started yet.
    /// The end is then recomputed as that unit's end, regardless of where
    /// the original end was. Applying the expansion twice is a no-op.
    pub fn expand_to_enclosing_unit(
        &self,
        source: &dyn TreeSource,
        unit: TextUnit,
    ) -> Result<TextRange> {
        let range = self.revalidated(source)?;
        if range.is_null() {
            return Ok(range);
        }
        let (start, _) = range.ordered(source)?;

        if unit == TextUnit::Document {
            let doc_start = start.create_position_at_document_start(source);
            let doc_end = start.create_position_at_document_end(source);
            return Ok(range.with_endpoints(source, doc_start, doc_end));
        }

        // Anchor on the content ahead: a position at the end of one leaf is
        // the same place as the start of the next, and expansion binds to
        // the unit that starts there.
        let start = start.forward_normalized(source)?;

        if unit == TextUnit::Character {
            if let Some(end) = start.create_next_character_position(source)? {
                return Ok(range.with_endpoints(source, start, end));
            }
            // At the document end the enclosing character is the one behind
            // the position; only an empty document leaves the range
            // degenerate.
            if let Some(prev) = start.create_previous_character_position(source)? {
                return Ok(range.with_endpoints(source, prev, start));
            }
            return Ok(range.with_endpoints(source, start.clone(), start));
        }

        let unit_start = if start.at_boundary(source, unit, BoundaryEdge::Start)? {
            start.clone()
        } else {
            match start.create_boundary_position(
                source,
                unit,
                BoundaryEdge::Start,
                MoveDirection::Backward,
            )? {
                Some(found) => found,
                // No unit has started yet; bind to the first one ahead.
                None => match start.create_boundary_position(
                    source,
                    unit,
                    BoundaryEdge::Start,
                    MoveDirection::Forward,
                )? {
                    Some(found) => found,
                    None => start.clone(),
                },
            }
        };
        let unit_start = unit_start.forward_normalized(source)?;
        let unit_end = unit_start
            .create_boundary_position(source, unit, BoundaryEdge::End, MoveDirection::Forward)?
            .unwrap_or_else(|| unit_start.create_position_at_document_end(source));
        Ok(range.with_endpoints(source, unit_start, unit_end))
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Finds `needle` inside the range's text.
    ///
    /// Scans forward, or backward for the *last* occurrence when `backward`
    /// is set. `ignore_case` folds both sides code-unit-wise (only 1:1
    /// lowercase mappings, so offsets stay stable). Returns the matching
    /// sub-range, a degenerate range at the start for an empty needle, or
    /// `Ok(None)` when there is no match — not-found is a normal result,
    /// not an error.
    pub fn find_text(
        &self,
        source: &dyn TreeSource,
        needle: &str,
        backward: bool,
        ignore_case: bool,
    ) -> Result<Option<TextRange>> {
        let range = self.revalidated(source)?;
        if range.is_null() {
            return Ok(None);
        }
        let (start, end) = range.ordered(source)?;
        if needle.is_empty() {
            return Ok(Some(TextRange::caret(source, start)));
        }
        let slices = Self::leaf_slices(source, &start, &end)?;

        // Concatenate the range text, remembering where each leaf begins.
        let mut haystack: Vec<u16> = Vec::new();
        let mut spans: Vec<(usize, &LeafSlice<'_>)> = Vec::new();
        for slice in &slices {
            spans.push((haystack.len(), slice));
            let text = slice.leaf.text_utf16();
            haystack.extend_from_slice(&text[slice.start..slice.end]);
        }
        let mut pattern: Vec<u16> = needle.encode_utf16().collect();
        if ignore_case {
            fold_case(&mut haystack);
            fold_case(&mut pattern);
        }
        if pattern.len() > haystack.len() {
            return Ok(None);
        }

        let match_at = |index: usize| haystack[index..index + pattern.len()] == pattern[..];
        let found = if backward {
            (0..=haystack.len() - pattern.len()).rev().find(|&i| match_at(i))
        } else {
            (0..=haystack.len() - pattern.len()).find(|&i| match_at(i))
        };
        let Some(match_start) = found else {
            return Ok(None);
        };
        let match_end = match_start + pattern.len();

        let start_pos = Self::position_at_haystack_offset(&spans, match_start)?;
        let end_pos = Self::position_at_haystack_offset(&spans, match_end)?;
        Ok(Some(TextRange::new(source, start_pos, end_pos)))
    }

    /// Maps an offset in the concatenated range text back to a position.
    fn position_at_haystack_offset(
        spans: &[(usize, &LeafSlice<'_>)],
        offset: usize,
    ) -> Result<TextPosition> {
        let (base, slice) = spans
            .iter()
            .rev()
            .find(|(base, _)| *base <= offset)
            .ok_or_else(|| Error::invalid_operation("search over an empty range"))?;
        let within = (offset - base).min(slice.len());
        Ok(TextPosition::text_position_unchecked(
            slice.leaf.tree_id(),
            slice.leaf.id(),
            slice.start + within,
            Affinity::Downstream,
        ))
    }

    /// Finds the maximal contiguous run of leaves inside the range whose
    /// computed `attribute` equals `value`.
    ///
    /// Scans from the range start, or from the range end when `backward` is
    /// set. The returned sub-range is clipped to the range's own endpoints.
    /// `Ok(None)` when no leaf in the range matches.
    pub fn find_attribute(
        &self,
        source: &dyn TreeSource,
        attribute: RangeAttribute,
        value: &AttrValue,
        backward: bool,
    ) -> Result<Option<TextRange>> {
        let range = self.revalidated(source)?;
        if range.is_null() {
            return Ok(None);
        }
        let (start, end) = range.ordered(source)?;
        let slices = Self::leaf_slices(source, &start, &end)?;
        let matches: Vec<bool> = slices
            .iter()
            .map(|slice| leaf_attribute_value(&slice.leaf, attribute).as_ref() == Some(value))
            .collect();

        let run = if backward {
            matches.iter().rposition(|&m| m).map(|last| {
                let mut first = last;
                while first > 0 && matches[first - 1] {
                    first -= 1;
                }
                (first, last)
            })
        } else {
            matches.iter().position(|&m| m).map(|first| {
                let mut last = first;
                while last + 1 < matches.len() && matches[last + 1] {
                    last += 1;
                }
                (first, last)
            })
        };
        let Some((first, last)) = run else {
            return Ok(None);
        };

        let start_slice = &slices[first];
        let end_slice = &slices[last];
        let start_pos = TextPosition::text_position_unchecked(
            start_slice.leaf.tree_id(),
            start_slice.leaf.id(),
            start_slice.start,
            Affinity::Downstream,
        );
        let end_pos = TextPosition::text_position_unchecked(
            end_slice.leaf.tree_id(),
            end_slice.leaf.id(),
            end_slice.end,
            Affinity::Downstream,
        );
        Ok(Some(TextRange::new(source, start_pos, end_pos)))
    }
}

/// Folds UTF-16 code units to lowercase where the mapping is 1:1, leaving
/// surrogates and multi-unit foldings untouched so offsets stay stable.
fn fold_case(units: &mut [u16]) {
    for unit in units.iter_mut() {
        if let Some(c) = char::from_u32(*unit as u32) {
            let mut lower = c.to_lowercase();
            if let (Some(folded), None) = (lower.next(), lower.next()) {
                if (folded as u32) <= 0xFFFF {
                    *unit = folded as u16;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_axtree::{NodeData, NodeId, Role, Tree, TreeId};

    fn text(id: u64, content: &str) -> NodeData {
        NodeData::new(NodeId::new(id), Role::StaticText).with_text(content)
    }

    fn two_leaf_tree() -> Tree {
        let mut tree = Tree::new(TreeId::new(1));
        tree.set_root(NodeData::new(NodeId::new(1), Role::Document)).unwrap();
        tree.push_child(NodeId::new(1), text(2, "some text")).unwrap();
        tree.push_child(NodeId::new(1), text(3, "more text")).unwrap();
        tree
    }

    fn pos(tree: &Tree, node: u64, offset: usize) -> TextPosition {
        TextPosition::text_position(
            tree,
            tree.id(),
            NodeId::new(node),
            offset,
            Affinity::Downstream,
        )
    }

    fn whole_document(tree: &Tree) -> TextRange {
        TextRange::new(tree, pos(tree, 2, 0), pos(tree, 3, 9))
    }

    #[test]
    fn test_degenerate_range_has_no_text() {
        let tree = two_leaf_tree();
        let caret = TextRange::caret(&tree, pos(&tree, 2, 4));
        assert!(caret.is_degenerate(&tree).unwrap());
        assert_eq!(caret.get_text(&tree, None).unwrap(), "");
    }

    #[test]
    fn test_get_text_spans_leaves() {
        let tree = two_leaf_tree();
        assert_eq!(
            whole_document(&tree).get_text(&tree, None).unwrap(),
            "some textmore text"
        );
    }

    #[test]
    fn test_get_text_respects_max_count() {
        let tree = two_leaf_tree();
        assert_eq!(whole_document(&tree).get_text(&tree, Some(11)).unwrap(), "some textmo");
        assert_eq!(whole_document(&tree).get_text(&tree, Some(0)).unwrap(), "");
    }

    #[test]
    fn test_reversed_construction_reads_in_order() {
        let tree = two_leaf_tree();
        let reversed = TextRange::new(&tree, pos(&tree, 3, 4), pos(&tree, 2, 2));
        assert_eq!(reversed.get_text(&tree, None).unwrap(), "me textmore");
        assert_eq!(
            reversed
                .compare_endpoints(&tree, RangeEndpoint::Start, &reversed, RangeEndpoint::End)
                .unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_move_by_character_collapses() {
        let tree = two_leaf_tree();
        let (moved, count) = whole_document(&tree)
            .move_by_unit(&tree, TextUnit::Character, 3)
            .unwrap();
        assert_eq!(count, 3);
        assert!(moved.is_degenerate(&tree).unwrap());
        assert_eq!(moved.start().text_offset(), Some(3));
    }

    #[test]
    fn test_move_clamps_at_document_edge() {
        let tree = two_leaf_tree();
        let caret = TextRange::caret(&tree, pos(&tree, 3, 7));
        let (moved, count) = caret.move_by_unit(&tree, TextUnit::Character, 10).unwrap();
        assert_eq!(count, 2);
        assert!(moved.start().at_end_of_document(&tree));
    }

    #[test]
    fn test_move_endpoint_crossing_collapses() {
        let tree = two_leaf_tree();
        let range = TextRange::new(&tree, pos(&tree, 2, 0), pos(&tree, 2, 2));
        let (moved, count) = range
            .move_endpoint_by_unit(&tree, RangeEndpoint::Start, TextUnit::Character, 5)
            .unwrap();
        assert_eq!(count, 5);
        // Start moved past end: the range collapsed rather than reordered.
        assert!(moved.is_degenerate(&tree).unwrap());
        assert_eq!(moved.start().text_offset(), Some(5));
        assert_eq!(
            moved
                .compare_endpoints(&tree, RangeEndpoint::Start, &moved, RangeEndpoint::End)
                .unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_move_endpoint_by_range() {
        let tree = two_leaf_tree();
        let a = TextRange::new(&tree, pos(&tree, 2, 0), pos(&tree, 2, 4));
        let b = TextRange::new(&tree, pos(&tree, 3, 0), pos(&tree, 3, 4));
        let joined = a
            .move_endpoint_by_range(&tree, RangeEndpoint::End, &b, RangeEndpoint::End)
            .unwrap();
        assert_eq!(joined.get_text(&tree, None).unwrap(), "some textmore");

        // Pulling the end before the start collapses.
        let collapsed = b
            .move_endpoint_by_range(&tree, RangeEndpoint::End, &a, RangeEndpoint::Start)
            .unwrap();
        assert!(collapsed.is_degenerate(&tree).unwrap());
    }

    #[test]
    fn test_find_text_forward_and_backward() {
        let tree = two_leaf_tree();
        let range = whole_document(&tree);

        let first = range.find_text(&tree, "text", false, false).unwrap().unwrap();
        assert_eq!(first.start().anchor_id(), Some(NodeId::new(2)));
        assert_eq!(first.start().text_offset(), Some(5));
        assert_eq!(first.get_text(&tree, None).unwrap(), "text");

        let last = range.find_text(&tree, "text", true, false).unwrap().unwrap();
        assert_eq!(last.start().anchor_id(), Some(NodeId::new(3)));
        assert_eq!(last.start().text_offset(), Some(5));
    }

    #[test]
    fn test_find_text_across_leaf_boundary() {
        let tree = two_leaf_tree();
        let range = whole_document(&tree);
        let found = range.find_text(&tree, "textmore", false, false).unwrap().unwrap();
        assert_eq!(found.start().anchor_id(), Some(NodeId::new(2)));
        assert_eq!(found.end().anchor_id(), Some(NodeId::new(3)));
        assert_eq!(found.get_text(&tree, None).unwrap(), "textmore");
    }

    #[test]
    fn test_find_text_case_insensitive() {
        let tree = two_leaf_tree();
        let range = whole_document(&tree);
        assert!(range.find_text(&tree, "MORE", false, false).unwrap().is_none());
        let found = range.find_text(&tree, "MORE", false, true).unwrap().unwrap();
        assert_eq!(found.get_text(&tree, None).unwrap(), "more");
    }

    #[test]
    fn test_find_text_not_found_is_distinct_from_empty_match() {
        let tree = two_leaf_tree();
        let range = whole_document(&tree);
        assert!(range.find_text(&tree, "absent", false, false).unwrap().is_none());

        let empty = range.find_text(&tree, "", false, false).unwrap().unwrap();
        assert!(empty.is_degenerate(&tree).unwrap());
    }

    #[test]
    fn test_find_attribute_run() {
        let mut tree = two_leaf_tree();
        tree.push_child(NodeId::new(1), text(4, " tail")).unwrap();
        tree.update_node(NodeId::new(3), |node| {
            node.set_int_attribute(IntAttr::FontWeight, 700);
        })
        .unwrap();
        let range = TextRange::new(&tree, pos(&tree, 2, 0), pos(&tree, 4, 5));

        let bold = range
            .find_attribute(&tree, RangeAttribute::FontWeight, &AttrValue::Int(700), false)
            .unwrap()
            .unwrap();
        assert_eq!(bold.get_text(&tree, None).unwrap(), "more text");

        let missing = range
            .find_attribute(&tree, RangeAttribute::FontWeight, &AttrValue::Int(400), false)
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_stale_range_revalidates_after_mutation() {
        let mut tree = two_leaf_tree();
        let range = whole_document(&tree);
        tree.set_text(NodeId::new(3), "less").unwrap();

        // The captured generation no longer matches; the range repairs
        // itself instead of reading out of bounds.
        assert_eq!(range.get_text(&tree, None).unwrap(), "some textless");
    }

    #[test]
    fn test_torn_down_tree_reports_unavailable() {
        let tree = two_leaf_tree();
        let range = whole_document(&tree);
        let empty = Tree::new(TreeId::new(9));
        let err = range.get_text(&empty, None).unwrap_err();
        assert!(matches!(err, Error::ElementNotAvailable { .. }));
    }
}
