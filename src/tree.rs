//! Element arena and per-frame dispatch.
//!
//! [`ElementTree`] owns every element and is the only place where one element
//! acts on another: containers delegate drawing to children, sequences hide
//! and show children, and text elements ask the nearest sequence to advance.
//!
//! # Frame flow
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//! tree.show(Instant::from_millis(0))?;
//! loop {
//!     let frame = clock.tick(now());
//!     tree.draw(&frame, &mut display)?;
//! }
//! ```

use alloc::vec::Vec;
use embassy_time::Instant;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, warn};

use crate::display::SubDisplay;
use crate::elements::{
    Container, DrawOutcome, Element, ElementId, ElementKind, SequenceElement, TextElement,
};
use crate::error::ElementError;
use crate::geometry::{Axis, band};
use crate::time::Frame;

/// Number of distinct element handles a tree can hand out.
pub const MAX_ELEMENTS: usize = u16::MAX as usize + 1;

/// Arena holding an element tree.
///
/// Elements are inserted once at setup and live as long as the tree. Children
/// are referenced by [`ElementId`], never owned by their parent.
#[derive(Default)]
pub struct ElementTree {
    elements: Vec<Element>,
    root: Option<ElementId>,
    #[cfg(test)]
    lifecycle: Vec<Lifecycle>,
}

/// Show/hide calls in the order they happened.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Show(ElementId),
    Hide(ElementId),
}

impl ElementTree {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            root: None,
            #[cfg(test)]
            lifecycle: Vec::new(),
        }
    }

    /// Add a detached element and return its handle.
    ///
    /// # Returns
    /// - `Ok(id)`: handle of the new element
    /// - `Err(TreeFull)`: every handle value is already taken
    pub fn insert(&mut self, kind: impl Into<ElementKind>) -> Result<ElementId, ElementError> {
        let index = u16::try_from(self.elements.len())
            .map_err(|_| ElementError::TreeFull { max: MAX_ELEMENTS })?;
        self.elements.push(Element::new(kind.into()));
        Ok(ElementId(index))
    }

    /// Append `child` to the container `parent`.
    ///
    /// # Returns
    /// - `Ok(index)`: position of the child within the parent
    /// - `Err`: unknown ids, a non-container parent, a child that already has
    ///   a parent, a cycle, or a full container
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<usize, ElementError> {
        self.get(parent)?;
        if self.get(child)?.parent.is_some() {
            return Err(ElementError::AlreadyAttached(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(ElementError::Cycle(child));
        }

        let index = self
            .node_mut(parent)
            .kind
            .container_mut()
            .ok_or(ElementError::NotAContainer(parent))?
            .push(child)?;
        self.node_mut(child).parent = Some(parent);
        Ok(index)
    }

    /// Make `id` the element drawn by [`draw`](Self::draw).
    ///
    /// Validates the subtree first: every container must have at least one
    /// child.
    pub fn set_root(&mut self, id: ElementId) -> Result<(), ElementError> {
        self.validate(id)?;
        self.root = Some(id);
        Ok(())
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    /// Check that no container in the subtree at `id` is empty.
    pub fn validate(&self, id: ElementId) -> Result<(), ElementError> {
        let mut pending = alloc::vec![id];
        while let Some(current) = pending.pop() {
            if let Some(container) = self.get(current)?.kind.container() {
                if container.is_empty() {
                    return Err(ElementError::EmptyContainer(current));
                }
                pending.extend_from_slice(container.children());
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Result<&Element, ElementError> {
        self.elements
            .get(id.index())
            .ok_or(ElementError::UnknownElement(id))
    }

    pub fn parent(&self, id: ElementId) -> Result<Option<ElementId>, ElementError> {
        Ok(self.get(id)?.parent)
    }

    /// Children of a container, empty for text elements.
    pub fn children(&self, id: ElementId) -> Result<&[ElementId], ElementError> {
        Ok(self
            .get(id)?
            .kind
            .container()
            .map(Container::children)
            .unwrap_or(&[]))
    }

    pub fn is_active(&self, id: ElementId) -> Result<bool, ElementError> {
        Ok(self.get(id)?.active)
    }

    /// Mark whether sequences may rotate onto this element.
    pub fn set_active(&mut self, id: ElementId, active: bool) -> Result<(), ElementError> {
        self.get(id)?;
        self.node_mut(id).active = active;
        Ok(())
    }

    pub fn is_visible(&self, id: ElementId) -> Result<bool, ElementError> {
        Ok(self.get(id)?.visible)
    }

    pub fn sequence(&self, id: ElementId) -> Result<&SequenceElement, ElementError> {
        match &self.get(id)?.kind {
            ElementKind::Sequence(seq) => Ok(seq),
            _ => Err(ElementError::NotASequence(id)),
        }
    }

    /// Index of the visible child of a sequence.
    pub fn current_index(&self, id: ElementId) -> Result<usize, ElementError> {
        Ok(self.sequence(id)?.index())
    }

    pub fn text(&self, id: ElementId) -> Result<&TextElement, ElementError> {
        match &self.get(id)?.kind {
            ElementKind::Text(text) => Ok(text),
            _ => Err(ElementError::NotText(id)),
        }
    }

    /// Mutable access to a text element, e.g. to attach a producer.
    pub fn text_mut(&mut self, id: ElementId) -> Result<&mut TextElement, ElementError> {
        self.get(id)?;
        match &mut self.node_mut(id).kind {
            ElementKind::Text(text) => Ok(text),
            _ => Err(ElementError::NotText(id)),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Show the root element.
    pub fn show(&mut self, now: Instant) -> Result<(), ElementError> {
        let root = self.root.ok_or(ElementError::NoRoot)?;
        self.on_show(root, now);
        Ok(())
    }

    /// Hide the root element.
    pub fn hide(&mut self) -> Result<(), ElementError> {
        let root = self.root.ok_or(ElementError::NoRoot)?;
        self.on_hide(root);
        Ok(())
    }

    /// Enter the visible state.
    ///
    /// Overlay, horizontal and vertical elements show every child. A sequence
    /// restarts at its first child and shows only that one.
    pub fn on_show(&mut self, id: ElementId, now: Instant) {
        let Some(node) = self.elements.get_mut(id.index()) else {
            return;
        };
        if node.visible {
            warn!("{} {:?} shown twice", node.kind.name(), id);
        }
        node.visible = true;
        #[cfg(test)]
        self.lifecycle.push(Lifecycle::Show(id));

        match &mut node.kind {
            ElementKind::Overlay(c) | ElementKind::Horizontal(c) | ElementKind::Vertical(c) => {
                let children = c.clone();
                for &child in children.children() {
                    self.on_show(child, now);
                }
            }
            ElementKind::Sequence(seq) => {
                seq.select(0, now);
                if let Some(child) = seq.current() {
                    self.on_show(child, now);
                }
            }
            ElementKind::Text(text) => text.on_show(),
        }
    }

    /// Leave the visible state. A sequence hides only its visible child.
    pub fn on_hide(&mut self, id: ElementId) {
        let Some(node) = self.elements.get_mut(id.index()) else {
            return;
        };
        if !node.visible {
            warn!("{} {:?} hidden twice", node.kind.name(), id);
        }
        node.visible = false;
        #[cfg(test)]
        self.lifecycle.push(Lifecycle::Hide(id));

        match &node.kind {
            ElementKind::Overlay(c) | ElementKind::Horizontal(c) | ElementKind::Vertical(c) => {
                let children = c.clone();
                for &child in children.children() {
                    self.on_hide(child);
                }
            }
            ElementKind::Sequence(seq) => {
                if let Some(child) = seq.current() {
                    self.on_hide(child);
                }
            }
            ElementKind::Text(_) => {}
        }
    }

    /// Ask `id` to move on to its next content.
    ///
    /// A sequence advances to the next active child, wrapping around, and
    /// stays put when no other child is active. Any other element forwards
    /// the request to its parent.
    pub fn on_next(&mut self, id: ElementId, now: Instant) {
        let Some(node) = self.elements.get(id.index()) else {
            return;
        };

        let ElementKind::Sequence(seq) = &node.kind else {
            if let Some(parent) = node.parent {
                self.on_next(parent, now);
            }
            return;
        };

        let next = seq.rotation_order().find(|&index| {
            seq.container()
                .get(index)
                .and_then(|child| self.elements.get(child.index()))
                .is_some_and(Element::is_active)
        });

        match next {
            Some(index) => self.transition(id, index, now),
            None => debug!("Sequence {:?} has no other active child", id),
        }
    }

    /// Switch the sequence `id` to the child at `index`.
    ///
    /// Hides the current child before showing the new one and restarts the
    /// rotation timer. Selecting the current child is a no-op.
    pub fn go_to(&mut self, id: ElementId, index: usize, now: Instant) -> Result<(), ElementError> {
        let len = self.sequence(id)?.container().len();
        if index >= len {
            return Err(ElementError::IndexOutOfRange { index, len });
        }
        self.transition(id, index, now);
        Ok(())
    }

    fn transition(&mut self, id: ElementId, index: usize, now: Instant) {
        let (previous, next) = {
            let ElementKind::Sequence(seq) = &mut self.node_mut(id).kind else {
                return;
            };
            if seq.index() == index {
                return;
            }
            let previous = seq.current();
            seq.select(index, now);
            (previous, seq.current())
        };

        debug!("Sequence {:?} -> child {}", id, index);
        if let Some(previous) = previous {
            self.on_hide(previous);
        }
        if let Some(next) = next {
            self.on_show(next, now);
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Draw the root element onto `display`.
    pub fn draw<D>(&mut self, frame: &Frame, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(root) = self.root else {
            warn!("No root element to draw");
            return Ok(());
        };
        let mut view = SubDisplay::new(display);
        self.draw_element(root, frame, &mut view)
    }

    /// Draw the element `id` onto `view`.
    pub fn draw_element<D>(
        &mut self,
        id: ElementId,
        frame: &Frame,
        view: &mut SubDisplay<'_, D>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(node) = self.elements.get_mut(id.index()) else {
            warn!("Skipping unknown element {:?}", id);
            return Ok(());
        };

        match &mut node.kind {
            ElementKind::Overlay(c) => {
                let children = c.clone();
                for &child in children.children() {
                    self.draw_element(child, frame, view)?;
                }
            }
            ElementKind::Horizontal(c) => {
                let children = c.clone();
                self.draw_bands(&children, Axis::Horizontal, frame, view)?;
            }
            ElementKind::Vertical(c) => {
                let children = c.clone();
                self.draw_bands(&children, Axis::Vertical, frame, view)?;
            }
            ElementKind::Sequence(seq) => {
                if seq.container().is_empty() {
                    warn!("Sequence {:?} has no children", id);
                    return Ok(());
                }
                if seq.rotation_due(frame.now) {
                    self.on_next(id, frame.now);
                }
                if let Ok(Some(child)) = self.sequence(id).map(SequenceElement::current) {
                    self.draw_element(child, frame, view)?;
                }
            }
            ElementKind::Text(text) => {
                if text.draw(frame, view)? == DrawOutcome::Next {
                    if let Some(parent) = node.parent {
                        self.on_next(parent, frame.now);
                    }
                }
            }
        }

        Ok(())
    }

    fn draw_bands<D>(
        &mut self,
        children: &Container,
        axis: Axis,
        frame: &Frame,
        view: &mut SubDisplay<'_, D>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let size = view.size();
        let count = children.len();
        if count == 0 {
            warn!("Skipping {:?} container without children", axis);
            return Ok(());
        }

        for (index, &child) in children.children().iter().enumerate() {
            if let Some(area) = band(size, axis, count, index) {
                let mut sub = view.sub_display(area);
                self.draw_element(child, frame, &mut sub)?;
            }
        }
        Ok(())
    }

    fn node_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.index()]
    }

    /// Whether `candidate` is `id` or one of its ancestors.
    fn is_ancestor_or_self(&self, candidate: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = self.elements.get(node.index()).and_then(|e| e.parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ScrollMode;
    use crate::framebuffer::FrameBuffer;
    use crate::geometry::Anchor;
    use embassy_time::Duration;
    use embedded_graphics::primitives::Rectangle;

    fn label(tree: &mut ElementTree, text: &str) -> ElementId {
        tree.insert(
            TextElement::new()
                .with_text(text)
                .unwrap()
                .with_background_color(Rgb565::BLUE),
        )
        .unwrap()
    }

    fn container_of(tree: &mut ElementTree, kind: ElementKind, children: &[ElementId]) -> ElementId {
        let id = tree.insert(kind).unwrap();
        for &child in children {
            tree.add_child(id, child).unwrap();
        }
        id
    }

    fn at(now_ms: u64) -> Instant {
        Instant::from_millis(now_ms)
    }

    fn visible_children(tree: &ElementTree, id: ElementId) -> usize {
        tree.children(id)
            .unwrap()
            .iter()
            .filter(|&&child| tree.is_visible(child).unwrap())
            .count()
    }

    #[test]
    fn test_horizontal_splits_surface_into_equal_columns() {
        let mut tree = ElementTree::new();
        let labels = [label(&mut tree, "A"), label(&mut tree, "B"), label(&mut tree, "C")];
        let row = container_of(&mut tree, ElementKind::horizontal(), &labels);
        tree.set_root(row).unwrap();
        tree.show(at(0)).unwrap();

        let mut fb = FrameBuffer::new(Size::new(300, 20));
        tree.draw(&Frame::from_millis(0, 0), &mut fb).unwrap();

        for (i, &id) in labels.iter().enumerate() {
            // Children measure in their own coordinates
            assert_eq!(
                tree.text(id).unwrap().measured_bounds(),
                Some(Rectangle::new(Point::zero(), Size::new(6, 10)))
            );
            let x = i as i32 * 100;
            assert_ne!(fb.pixel(Point::new(x + 5, 9)), Some(Rgb565::BLACK));
            assert_eq!(fb.pixel(Point::new(x + 6, 0)), Some(Rgb565::BLACK));
        }
        assert_eq!(fb.pixel(Point::new(99, 0)), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(Point::new(199, 0)), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_horizontal_clips_children_to_their_column() {
        let mut tree = ElementTree::new();
        let wide = label(&mut tree, "WWWWWWWWWW");
        let narrow = label(&mut tree, "x");
        let row = container_of(&mut tree, ElementKind::horizontal(), &[wide, narrow]);
        tree.set_root(row).unwrap();
        tree.show(at(0)).unwrap();

        // Each column is 20 px wide, the first label is 60 px long
        let mut fb = FrameBuffer::new(Size::new(40, 10));
        tree.draw(&Frame::from_millis(0, 0), &mut fb).unwrap();

        assert_ne!(fb.pixel(Point::new(19, 0)), Some(Rgb565::BLACK));
        // Second column only holds the 6 px wide "x"
        assert_eq!(fb.pixel(Point::new(27, 0)), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_vertical_splits_surface_into_equal_rows() {
        let mut tree = ElementTree::new();
        let top = label(&mut tree, "T");
        let bottom = label(&mut tree, "B");
        let column = container_of(&mut tree, ElementKind::vertical(), &[top, bottom]);
        tree.set_root(column).unwrap();
        tree.show(at(0)).unwrap();

        let mut fb = FrameBuffer::new(Size::new(30, 40));
        tree.draw(&Frame::from_millis(0, 0), &mut fb).unwrap();

        assert_ne!(fb.pixel(Point::new(5, 9)), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(Point::new(5, 10)), Some(Rgb565::BLACK));
        assert_ne!(fb.pixel(Point::new(5, 29)), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(Point::new(5, 19)), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(Point::new(20, 20)), Some(Rgb565::BLACK));
    }

    #[test]
    fn test_overlay_paints_later_children_on_top() {
        let mut tree = ElementTree::new();
        let under = tree.insert(
            TextElement::new()
                .with_text("A")
                .unwrap()
                .with_background_color(Rgb565::RED),
        )
        .unwrap();
        let over = label(&mut tree, " ");
        let stack = container_of(&mut tree, ElementKind::overlay(), &[under, over]);
        tree.set_root(stack).unwrap();
        tree.show(at(0)).unwrap();

        let mut fb = FrameBuffer::new(Size::new(20, 10));
        tree.draw(&Frame::from_millis(0, 0), &mut fb).unwrap();

        for x in 0..6 {
            for y in 0..10 {
                assert_eq!(fb.pixel(Point::new(x, y)), Some(Rgb565::BLUE));
            }
        }
    }

    #[test]
    fn test_show_and_hide_propagate_to_every_child() {
        let mut tree = ElementTree::new();
        let a = label(&mut tree, "a");
        let b = label(&mut tree, "b");
        let stack = container_of(&mut tree, ElementKind::overlay(), &[a, b]);
        tree.set_root(stack).unwrap();

        tree.show(at(0)).unwrap();
        assert!(tree.is_visible(stack).unwrap());
        assert_eq!(visible_children(&tree, stack), 2);

        tree.hide().unwrap();
        assert!(!tree.is_visible(stack).unwrap());
        assert_eq!(visible_children(&tree, stack), 0);
    }

    #[test]
    fn test_sequence_rotates_at_duration_boundary() {
        let mut tree = ElementTree::new();
        let first = label(&mut tree, "1");
        let second = label(&mut tree, "2");
        let seq = container_of(
            &mut tree,
            ElementKind::sequence(Duration::from_millis(5000)),
            &[first, second],
        );
        tree.set_root(seq).unwrap();
        tree.show(at(0)).unwrap();

        let mut fb = FrameBuffer::new(Size::new(32, 10));
        tree.draw(&Frame::from_millis(4999, 4999), &mut fb).unwrap();
        assert_eq!(tree.current_index(seq).unwrap(), 0);
        assert!(tree.is_visible(first).unwrap());
        assert!(!tree.is_visible(second).unwrap());

        tree.draw(&Frame::from_millis(5000, 1), &mut fb).unwrap();
        assert_eq!(tree.current_index(seq).unwrap(), 1);
        assert!(!tree.is_visible(first).unwrap());
        assert!(tree.is_visible(second).unwrap());

        // The rotation window restarted at the transition
        tree.draw(&Frame::from_millis(9999, 4999), &mut fb).unwrap();
        assert_eq!(tree.current_index(seq).unwrap(), 1);
        tree.draw(&Frame::from_millis(10000, 1), &mut fb).unwrap();
        assert_eq!(tree.current_index(seq).unwrap(), 0);
    }

    #[test]
    fn test_sequence_draws_only_visible_child() {
        let mut tree = ElementTree::new();
        let first = label(&mut tree, "1");
        let second = label(&mut tree, "2");
        let seq = container_of(
            &mut tree,
            ElementKind::sequence(Duration::from_secs(5)),
            &[first, second],
        );
        tree.set_root(seq).unwrap();
        tree.show(at(0)).unwrap();

        let mut fb = FrameBuffer::new(Size::new(32, 10));
        tree.draw(&Frame::from_millis(0, 0), &mut fb).unwrap();

        assert!(tree.text(first).unwrap().measured_bounds().is_some());
        // Never drawn, so never measured
        assert_eq!(tree.text(second).unwrap().measured_bounds(), None);
    }

    #[test]
    fn test_on_next_skips_inactive_children() {
        let mut tree = ElementTree::new();
        let children: Vec<ElementId> = (0..4).map(|_| label(&mut tree, "x")).collect();
        let seq = container_of(&mut tree, ElementKind::sequence(Duration::from_secs(1)), &children);
        tree.set_root(seq).unwrap();
        tree.show(at(0)).unwrap();

        tree.set_active(children[1], false).unwrap();
        tree.set_active(children[2], false).unwrap();

        tree.on_next(seq, at(10));
        assert_eq!(tree.current_index(seq).unwrap(), 3);

        tree.on_next(seq, at(20));
        assert_eq!(tree.current_index(seq).unwrap(), 0);

        tree.set_active(children[2], true).unwrap();
        tree.on_next(seq, at(30));
        assert_eq!(tree.current_index(seq).unwrap(), 2);
    }

    #[test]
    fn test_on_next_without_active_children_keeps_current() {
        let mut tree = ElementTree::new();
        let children: Vec<ElementId> = (0..3).map(|_| label(&mut tree, "x")).collect();
        let seq = container_of(&mut tree, ElementKind::sequence(Duration::from_secs(1)), &children);
        tree.set_root(seq).unwrap();
        tree.show(at(0)).unwrap();

        for &child in &children {
            tree.set_active(child, false).unwrap();
        }

        tree.on_next(seq, at(10));
        assert_eq!(tree.current_index(seq).unwrap(), 0);
        assert!(tree.is_visible(children[0]).unwrap());

        // Rotation keeps being attempted while due, and keeps failing quietly
        let mut fb = FrameBuffer::new(Size::new(16, 10));
        tree.draw(&Frame::from_millis(2000, 2000), &mut fb).unwrap();
        tree.draw(&Frame::from_millis(2033, 33), &mut fb).unwrap();
        assert_eq!(tree.current_index(seq).unwrap(), 0);
        assert_eq!(visible_children(&tree, seq), 1);
    }

    #[test]
    fn test_exactly_one_sequence_child_visible() {
        let mut tree = ElementTree::new();
        let children: Vec<ElementId> = (0..5).map(|_| label(&mut tree, "x")).collect();
        let seq = container_of(
            &mut tree,
            ElementKind::sequence(Duration::from_millis(100)),
            &children,
        );
        tree.set_root(seq).unwrap();
        tree.show(at(0)).unwrap();
        tree.set_active(children[3], false).unwrap();

        let mut fb = FrameBuffer::new(Size::new(16, 10));
        let mut now = 0;
        for step in 0..200u64 {
            now += 37;
            if step % 7 == 0 {
                tree.go_to(seq, (step as usize / 7) % children.len(), at(now))
                    .unwrap();
            } else {
                tree.draw(&Frame::from_millis(now, 37), &mut fb).unwrap();
            }

            assert_eq!(visible_children(&tree, seq), 1);
            let current = tree.current_index(seq).unwrap();
            assert!(tree.is_visible(children[current]).unwrap());
        }
    }

    #[test]
    fn test_transitions_hide_before_show() {
        let mut tree = ElementTree::new();
        let first = label(&mut tree, "a");
        let left = label(&mut tree, "b");
        let right = label(&mut tree, "c");
        let row = container_of(&mut tree, ElementKind::horizontal(), &[left, right]);
        let last = label(&mut tree, "d");
        let seq = container_of(
            &mut tree,
            ElementKind::sequence(Duration::from_millis(100)),
            &[first, row, last],
        );
        tree.set_root(seq).unwrap();
        tree.show(at(0)).unwrap();
        assert_eq!(
            tree.lifecycle,
            [Lifecycle::Show(seq), Lifecycle::Show(first)]
        );

        tree.lifecycle.clear();
        tree.go_to(seq, 1, at(10)).unwrap();
        assert_eq!(
            tree.lifecycle,
            [
                Lifecycle::Hide(first),
                Lifecycle::Show(row),
                Lifecycle::Show(left),
                Lifecycle::Show(right),
            ]
        );

        // Timed rotation goes through the same path
        tree.lifecycle.clear();
        let mut fb = FrameBuffer::new(Size::new(16, 10));
        tree.draw(&Frame::from_millis(110, 100), &mut fb).unwrap();
        assert_eq!(
            tree.lifecycle,
            [
                Lifecycle::Hide(row),
                Lifecycle::Hide(left),
                Lifecycle::Hide(right),
                Lifecycle::Show(last),
            ]
        );

        // Selecting the visible child touches nobody
        tree.lifecycle.clear();
        tree.go_to(seq, 2, at(120)).unwrap();
        assert!(tree.lifecycle.is_empty());
    }

    #[test]
    fn test_insert_rejects_handle_overflow() {
        let mut tree = ElementTree::new();
        let first = tree.insert(ElementKind::overlay()).unwrap();
        for _ in 1..MAX_ELEMENTS {
            tree.insert(ElementKind::overlay()).unwrap();
        }
        assert_eq!(tree.len(), MAX_ELEMENTS);

        assert_eq!(
            tree.insert(ElementKind::overlay()),
            Err(ElementError::TreeFull { max: MAX_ELEMENTS })
        );
        assert_eq!(tree.len(), MAX_ELEMENTS);
        // Earlier handles still address their own element
        assert_eq!(tree.get(first).unwrap().parent(), None);
        assert_eq!(first, ElementId(0));
    }

    #[test]
    fn test_go_to_validates_target() {
        let mut tree = ElementTree::new();
        let a = label(&mut tree, "a");
        let b = label(&mut tree, "b");
        let seq = container_of(&mut tree, ElementKind::sequence(Duration::from_secs(1)), &[a, b]);
        tree.set_root(seq).unwrap();
        tree.show(at(0)).unwrap();

        assert_eq!(
            tree.go_to(seq, 2, at(0)),
            Err(ElementError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(tree.go_to(a, 0, at(0)), Err(ElementError::NotASequence(a)));

        // Selecting the current child changes nothing, not even the timer
        tree.go_to(seq, 0, at(900)).unwrap();
        let mut fb = FrameBuffer::new(Size::new(16, 10));
        tree.draw(&Frame::from_millis(1000, 100), &mut fb).unwrap();
        assert_eq!(tree.current_index(seq).unwrap(), 1);
    }

    #[test]
    fn test_sequence_hide_touches_only_current_child() {
        let mut tree = ElementTree::new();
        let a = label(&mut tree, "a");
        let b = label(&mut tree, "b");
        let seq = container_of(&mut tree, ElementKind::sequence(Duration::from_secs(1)), &[a, b]);
        tree.set_root(seq).unwrap();

        tree.show(at(0)).unwrap();
        tree.go_to(seq, 1, at(10)).unwrap();
        tree.hide().unwrap();

        assert!(!tree.is_visible(a).unwrap());
        assert!(!tree.is_visible(b).unwrap());

        // Showing again restarts from the first child
        tree.show(at(20)).unwrap();
        assert_eq!(tree.current_index(seq).unwrap(), 0);
        assert!(tree.is_visible(a).unwrap());
        assert!(!tree.is_visible(b).unwrap());
    }

    #[test]
    fn test_scrolled_out_text_advances_enclosing_sequence() {
        let mut tree = ElementTree::new();
        let ticker = tree.insert(
            TextElement::new()
                .with_text("news")
                .unwrap()
                .with_scroll(ScrollMode::Left, 1000.0),
        )
        .unwrap();
        // Wrapped in a row to check that the request bubbles up
        let row = container_of(&mut tree, ElementKind::horizontal(), &[ticker]);
        let clock = label(&mut tree, "12:00");
        let seq = container_of(
            &mut tree,
            ElementKind::sequence(Duration::from_secs(60)),
            &[row, clock],
        );
        tree.set_root(seq).unwrap();
        tree.show(at(0)).unwrap();

        // 20 px surface, "news" is 24 px: 20 + 24 + 1 px of travel to leave
        let mut fb = FrameBuffer::new(Size::new(20, 10));
        let mut now = 0;
        while tree.current_index(seq).unwrap() == 0 {
            now += 1;
            assert!(now < 1000, "ticker never finished");
            tree.draw(&Frame::from_millis(now, 1), &mut fb).unwrap();
        }

        assert_eq!(now, 45);
        assert!(tree.is_visible(clock).unwrap());
        assert!(!tree.is_visible(ticker).unwrap());
        assert_eq!(tree.text(ticker).unwrap().scroll_offset(), 0.0);
    }

    #[test]
    fn test_scroll_exit_outside_sequence_is_harmless() {
        let mut tree = ElementTree::new();
        let ticker = tree.insert(
            TextElement::new()
                .with_text("go")
                .unwrap()
                .with_scroll(ScrollMode::Down, 1000.0),
        )
        .unwrap();
        tree.set_root(ticker).unwrap();
        tree.show(at(0)).unwrap();

        let mut fb = FrameBuffer::new(Size::new(20, 10));
        for now in 1..=40 {
            tree.draw(&Frame::from_millis(now, 1), &mut fb).unwrap();
        }
        // Wrapped at least once and started over
        assert!(tree.text(ticker).unwrap().scroll_offset() < 40.0);
    }

    #[test]
    fn test_add_child_rejects_bad_wiring() {
        let mut tree = ElementTree::new();
        let text = label(&mut tree, "t");
        let outer = tree.insert(ElementKind::overlay()).unwrap();
        let inner = tree.insert(ElementKind::vertical()).unwrap();

        assert_eq!(tree.add_child(text, outer), Err(ElementError::NotAContainer(text)));

        tree.add_child(outer, inner).unwrap();
        assert_eq!(tree.add_child(inner, outer), Err(ElementError::Cycle(outer)));
        assert_eq!(tree.add_child(inner, inner), Err(ElementError::AlreadyAttached(inner)));

        let lonely = tree.insert(ElementKind::horizontal()).unwrap();
        assert_eq!(tree.add_child(lonely, lonely), Err(ElementError::Cycle(lonely)));

        tree.add_child(inner, text).unwrap();
        assert_eq!(tree.add_child(outer, text), Err(ElementError::AlreadyAttached(text)));
        assert_eq!(tree.parent(text).unwrap(), Some(inner));

        let bogus = ElementId(999);
        assert_eq!(tree.add_child(outer, bogus), Err(ElementError::UnknownElement(bogus)));
    }

    #[test]
    fn test_set_root_rejects_empty_containers() {
        let mut tree = ElementTree::new();
        let text = label(&mut tree, "t");
        let empty = tree.insert(ElementKind::horizontal()).unwrap();
        let root = container_of(&mut tree, ElementKind::vertical(), &[text, empty]);

        assert_eq!(tree.set_root(root), Err(ElementError::EmptyContainer(empty)));
        assert_eq!(tree.root(), None);

        let filler = label(&mut tree, "f");
        tree.add_child(empty, filler).unwrap();
        assert_eq!(tree.set_root(root), Ok(()));
    }

    #[test]
    fn test_drawing_degenerate_trees_is_a_no_op() {
        let mut fb = FrameBuffer::new(Size::new(16, 16));

        let mut tree = ElementTree::new();
        tree.draw(&Frame::from_millis(0, 0), &mut fb).unwrap();
        assert_eq!(tree.show(at(0)), Err(ElementError::NoRoot));

        // Emptiness slipping past validation is skipped, not a panic
        let row = tree.insert(ElementKind::horizontal()).unwrap();
        let seq = tree.insert(ElementKind::sequence(Duration::from_secs(1))).unwrap();
        let mut view = SubDisplay::new(&mut fb);
        tree.on_show(seq, at(0));
        tree.draw_element(row, &Frame::from_millis(0, 0), &mut view).unwrap();
        tree.draw_element(seq, &Frame::from_millis(5000, 5000), &mut view).unwrap();
        tree.on_next(seq, at(5000));
        drop(view);

        assert_eq!(fb.dirty_region(), None);
    }

    #[test]
    fn test_text_mut_attaches_producer() {
        let mut tree = ElementTree::new();
        let text = tree.insert(TextElement::new().with_anchor(Anchor::TOP_LEFT)).unwrap();
        let row = container_of(&mut tree, ElementKind::horizontal(), &[text]);
        tree.set_root(row).unwrap();

        assert_eq!(tree.text_mut(row).err(), Some(ElementError::NotText(row)));
        tree.text_mut(text)
            .unwrap()
            .set_lambda(|| crate::elements::text::text_buf("42").unwrap());

        tree.show(at(0)).unwrap();
        let mut fb = FrameBuffer::new(Size::new(16, 10));
        tree.draw(&Frame::from_millis(0, 0), &mut fb).unwrap();
        assert_eq!(tree.text(text).unwrap().text(), Some("42"));
    }
}
