//! Composable layout elements for small embedded displays
//!
//! A screen is described as a tree of elements: overlays that stack their
//! children, horizontal and vertical splits that give each child an equal
//! band, sequences that rotate through their children on a timer, and text
//! elements with optional dynamic content and scrolling. Every element draws
//! into a [`SubDisplay`], a clipped and translated view of the real target.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod display;
pub mod elements;
pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod style;
pub mod time;
pub mod tree;

pub use config::{ElementConfig, NodeConfig, TextConfig};
pub use display::SubDisplay;
pub use elements::{
    DrawOutcome, Element, ElementId, ElementKind, ScrollMode, SequenceElement, TextElement,
};
pub use error::ElementError;
pub use framebuffer::FrameBuffer;
pub use geometry::{Anchor, Axis, FractionalPoint};
pub use style::{HorizontalAlign, TextAlign, TextSize, VerticalAlign};
pub use time::{Frame, FrameClock, Timer};
pub use tree::ElementTree;
