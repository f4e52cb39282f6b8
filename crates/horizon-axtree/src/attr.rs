//! Typed attribute keys for accessibility nodes.
//!
//! Each node carries small per-type attribute tables keyed by the closed
//! enums in this module. The tables are ordered vectors rather than hash
//! maps: nodes rarely hold more than a handful of attributes, and a linear
//! scan over a `Vec` beats hashing at that size.

/// Boolean attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolAttr {
    /// The node forces a line break before and after its content, the way
    /// block-level elements do. Paragraph boundaries are computed from the
    /// nearest ancestor carrying this attribute (or a block role).
    IsLineBreakingObject,
    /// The node forces a page break in a paginated document.
    IsPageBreakingObject,
    /// The node is the root of an editable region.
    EditableRoot,
}

/// Integer attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntAttr {
    /// Bit set of text style flags (bold, italic, underline, ...).
    TextStyle,
    /// Font weight (CSS-like 100..900 scale).
    FontWeight,
    /// Foreground color, packed RGBA.
    ForegroundColor,
    /// Background color, packed RGBA.
    BackgroundColor,
}

/// Floating-point attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatAttr {
    /// Font size in points.
    FontSize,
}

/// String attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrAttr {
    /// Font family name.
    FontFamily,
    /// BCP-47 language tag.
    Language,
    /// Tooltip text.
    Tooltip,
}

/// Integer-list attributes.
///
/// Offsets are UTF-16 code unit offsets into the owning node's exposed
/// text. The tree owner precomputes these during layout; when the word
/// lists are absent the node derives them from its text on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntListAttr {
    /// Offsets at which words start.
    WordStarts,
    /// Offsets one past the last code unit of each word.
    WordEnds,
    /// Offsets at which visual lines start, including soft wraps.
    LineStarts,
    /// Offsets one past the last code unit of each visual line.
    LineEnds,
    /// Per-character pixel offsets. Stored as opaque layout data.
    CharacterOffsets,
}

/// A small ordered attribute table.
///
/// Insertion replaces an existing entry for the same key; lookup is a
/// linear scan.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AttrTable<K: Copy + Eq, V> {
    entries: Vec<(K, V)>,
}

impl<K: Copy + Eq, V> Default for AttrTable<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Copy + Eq, V> AttrTable<K, V> {
    pub(crate) fn get(&self, key: K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub(crate) fn set(&mut self, key: K, value: V) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub(crate) fn remove(&mut self, key: K) -> Option<V> {
        let idx = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(idx).1)
    }
}
