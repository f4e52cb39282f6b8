//! Accessibility roles for tree nodes.
//!
//! The role describes a node's purpose to assistive technologies. Text
//! navigation stays role-agnostic except at a small number of extension
//! points (line breaking, page breaking, object replacement), which are
//! exposed as predicate methods here rather than per-role virtual dispatch.

/// The semantic role of an accessibility node.
///
/// This is a closed set: navigation code matches on roles through the
/// predicate methods below instead of enumerating variants at every call
/// site, so adding a role only requires revisiting those predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Role could not be determined.
    #[default]
    Unknown,

    /// The root of a document.
    Document,
    /// A generic grouping container.
    Group,
    /// A paragraph of text.
    Paragraph,
    /// A heading.
    Heading,
    /// A run of static text. Its name is its exposed text.
    StaticText,
    /// A fragment of laid-out text within a static text node.
    InlineTextBox,
    /// A forced line break (`<br>`-like). Exposes a newline.
    LineBreak,
    /// A list container.
    List,
    /// An item within a list.
    ListItem,
    /// The bullet or number marker of a list item.
    ListMarker,
    /// An image.
    Image,
    /// A push button.
    Button,
    /// A check box.
    CheckBox,
    /// An editable text field.
    TextInput,
    /// A hyperlink.
    Link,
    /// A table container.
    Table,
    /// A table row.
    Row,
    /// A table cell.
    Cell,
    /// An explicit page break in a paginated document.
    PageBreak,
    /// A visual or semantic splitter between sections.
    Splitter,
    /// A node that hosts an embedded sub-document.
    EmbeddedObject,
}

impl Role {
    /// Whether nodes with this role carry their own exposed text.
    #[inline]
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Role::StaticText | Role::InlineTextBox | Role::LineBreak
        )
    }

    /// Whether this role is a forced line break.
    #[inline]
    pub fn is_line_break(self) -> bool {
        matches!(self, Role::LineBreak)
    }

    /// Whether this role always breaks pagination.
    #[inline]
    pub fn is_page_break(self) -> bool {
        matches!(self, Role::PageBreak)
    }

    /// Whether this role establishes a block-level container.
    ///
    /// Block containers start their content on a new line; the paragraph
    /// boundary computation compares the nearest block ancestor of adjacent
    /// leaves.
    #[inline]
    pub fn is_block_container(self) -> bool {
        matches!(
            self,
            Role::Document
                | Role::Paragraph
                | Role::Heading
                | Role::List
                | Role::ListItem
                | Role::Table
                | Role::Row
                | Role::Cell
        )
    }

    /// Whether a childless, textless node with this role stands in for
    /// content that cannot be expressed as text.
    ///
    /// Such nodes expose a single object replacement character (U+FFFC) so
    /// positions can land on them, and they always form their own format
    /// and paragraph boundaries.
    #[inline]
    pub fn is_object_replacement(self) -> bool {
        matches!(
            self,
            Role::Image
                | Role::Button
                | Role::CheckBox
                | Role::TextInput
                | Role::EmbeddedObject
                | Role::Splitter
        )
    }
}
