//! Carousel state: which child is visible and when to rotate.
//!
//! The transitions themselves (hide the old child, show the new one) touch
//! other elements and are driven by [`ElementTree`](crate::tree::ElementTree).

use embassy_time::{Duration, Instant};

use super::{Container, ElementId};
use crate::time::Timer;

/// Time-multiplexed container showing exactly one child at a time.
///
/// # Examples
/// ```ignore
/// let carousel = tree.insert(ElementKind::sequence(Duration::from_secs(5)))?;
/// tree.add_child(carousel, temperature)?;
/// tree.add_child(carousel, humidity)?;
/// ```
#[derive(Debug, Clone)]
pub struct SequenceElement {
    children: Container,
    index: usize,
    timer: Timer,
}

impl SequenceElement {
    pub fn new(duration: Duration) -> Self {
        Self {
            children: Container::new(),
            index: 0,
            timer: Timer::new(duration),
        }
    }

    pub fn container(&self) -> &Container {
        &self.children
    }

    pub(crate) fn container_mut(&mut self) -> &mut Container {
        &mut self.children
    }

    /// Index of the visible child.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Handle of the visible child, `None` for an empty sequence.
    pub fn current(&self) -> Option<ElementId> {
        self.children.get(self.index)
    }

    /// How long each child stays on screen.
    pub fn duration(&self) -> Duration {
        self.timer.duration()
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.timer.set_duration(duration);
    }

    pub(crate) fn rotation_due(&self, now: Instant) -> bool {
        self.timer.check(now)
    }

    /// Move the visible slot and restart the rotation window.
    pub(crate) fn select(&mut self, index: usize, now: Instant) {
        self.index = index;
        self.timer.reset(now);
    }

    /// Candidate indices for the next rotation: every other child, in
    /// wrap-around order starting right after the current one.
    pub(crate) fn rotation_order(&self) -> impl Iterator<Item = usize> + use<> {
        let len = self.children.len();
        let start = self.index;
        (1..len).map(move |offset| (start + offset) % len)
    }
}
