//! Ordered child list shared by every container element.

use heapless::Vec;

use super::{ElementId, MAX_CHILDREN};
use crate::error::ElementError;

/// Ordered, non-owning list of child handles.
///
/// Insertion order is draw order for overlays and position order for
/// horizontal, vertical and sequence elements. The children themselves live
/// in the [`ElementTree`](crate::tree::ElementTree).
#[derive(Debug, Clone, Default)]
pub struct Container {
    children: Vec<ElementId, MAX_CHILDREN>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    /// Append a child.
    ///
    /// # Returns
    /// - `Ok(index)`: position of the child
    /// - `Err(ContainerFull)`: the container reached `MAX_CHILDREN`
    pub(crate) fn push(&mut self, child: ElementId) -> Result<usize, ElementError> {
        self.children
            .push(child)
            .map_err(|_| ElementError::ContainerFull { max: MAX_CHILDREN })?;
        Ok(self.children.len() - 1)
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn get(&self, index: usize) -> Option<ElementId> {
        self.children.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
