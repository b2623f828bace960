//! Setup-time errors for building and wiring element trees.
//!
//! Per-frame drawing never produces an [`ElementError`]; anomalies met while
//! drawing are logged and the frame carries on.

use thiserror_no_std::Error;

use crate::elements::ElementId;

/// Errors raised while assembling or addressing an element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ElementError {
    /// The handle does not belong to this tree
    #[error("Unknown element {0:?}")]
    UnknownElement(ElementId),

    /// Children can only be added to overlay, horizontal, vertical or sequence elements
    #[error("Element {0:?} is not a container")]
    NotAContainer(ElementId),

    #[error("Element {0:?} is not a sequence")]
    NotASequence(ElementId),

    #[error("Element {0:?} is not a text element")]
    NotText(ElementId),

    /// Every element has exactly one parent
    #[error("Element {0:?} already has a parent")]
    AlreadyAttached(ElementId),

    /// Attaching the element would make it its own ancestor
    #[error("Attaching {0:?} would create a cycle")]
    Cycle(ElementId),

    #[error("Element tree capacity exceeded (max: {max})")]
    TreeFull {
        /// Maximum number of elements per tree
        max: usize,
    },

    #[error("Container capacity exceeded (max: {max})")]
    ContainerFull {
        /// Maximum number of children per container
        max: usize,
    },

    /// Containers subdivide their surface among children, zero is a configuration error
    #[error("Container {0:?} has no children")]
    EmptyContainer(ElementId),

    #[error("Index {index} out of range for {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Text exceeds capacity (max: {max} bytes)")]
    TextTooLong {
        /// Maximum text length in bytes
        max: usize,
    },

    #[error("No root element set")]
    NoRoot,

    /// The serialized layout could not be decoded
    #[error("Failed to decode layout configuration")]
    Decode,

    #[error("Failed to encode layout configuration")]
    Encode,
}
