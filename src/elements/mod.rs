//! Concrete element types.
//!
//! Layout containers refer to heterogeneous children *without* trait objects.
//! In embedded-graphics, `DrawTarget` is generic, so a `draw` method cannot be
//! object-safe. Elements are therefore a closed enum stored in an
//! [`ElementTree`](crate::tree::ElementTree) and addressed by [`ElementId`].

pub mod container;
pub mod sequence;
pub mod text;

pub use container::Container;
pub use sequence::SequenceElement;
pub use text::{ScrollMode, TextBuf, TextElement, TextSource};

use embassy_time::Duration;

/// Maximum number of children a single container can hold.
pub const MAX_CHILDREN: usize = 16;

/// Stable handle to an element inside an [`ElementTree`](crate::tree::ElementTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u16);

impl ElementId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// What an element asks of its ancestors after drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum DrawOutcome {
    Continue,
    /// The element finished its content (e.g. scrolling text left the surface)
    /// and the nearest enclosing sequence should advance.
    Next,
}

/// The element variants.
pub enum ElementKind {
    /// Draws every child on the same surface, later children on top.
    Overlay(Container),
    /// Splits the surface into equal-width columns, one per child.
    Horizontal(Container),
    /// Splits the surface into equal-height rows, one per child.
    Vertical(Container),
    /// Shows one child at a time and rotates through the active ones.
    Sequence(SequenceElement),
    Text(TextElement),
}

impl ElementKind {
    pub fn overlay() -> Self {
        Self::Overlay(Container::new())
    }

    pub fn horizontal() -> Self {
        Self::Horizontal(Container::new())
    }

    pub fn vertical() -> Self {
        Self::Vertical(Container::new())
    }

    pub fn sequence(duration: Duration) -> Self {
        Self::Sequence(SequenceElement::new(duration))
    }

    /// Short type tag, used in log messages.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Overlay(_) => "overlay",
            ElementKind::Horizontal(_) => "horizontal",
            ElementKind::Vertical(_) => "vertical",
            ElementKind::Sequence(_) => "sequence",
            ElementKind::Text(_) => "text",
        }
    }

    pub fn container(&self) -> Option<&Container> {
        match self {
            ElementKind::Overlay(c) | ElementKind::Horizontal(c) | ElementKind::Vertical(c) => {
                Some(c)
            }
            ElementKind::Sequence(s) => Some(s.container()),
            ElementKind::Text(_) => None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut Container> {
        match self {
            ElementKind::Overlay(c) | ElementKind::Horizontal(c) | ElementKind::Vertical(c) => {
                Some(c)
            }
            ElementKind::Sequence(s) => Some(s.container_mut()),
            ElementKind::Text(_) => None,
        }
    }
}

impl From<TextElement> for ElementKind {
    fn from(text: TextElement) -> Self {
        Self::Text(text)
    }
}

impl From<SequenceElement> for ElementKind {
    fn from(sequence: SequenceElement) -> Self {
        Self::Sequence(sequence)
    }
}

/// A node of the element tree.
pub struct Element {
    pub(crate) kind: ElementKind,
    pub(crate) parent: Option<ElementId>,
    pub(crate) active: bool,
    pub(crate) visible: bool,
}

impl Element {
    pub(crate) fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            parent: None,
            active: true,
            visible: false,
        }
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Whether a sequence may rotate onto this element.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the element is between an `on_show` and its matching `on_hide`.
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
