//! Declarative layout description.
//!
//! A layout is a tree of [`ElementConfig`] nodes. Text is borrowed, so a layout
//! can be decoded straight out of a postcard blob in flash without copying.
//! Dynamic text producers are code, not data: attach them after building via
//! [`ElementTree::text_mut`].
//!
//! # Examples
//! ```ignore
//! let layout = ElementConfig::vertical(vec![
//!     ElementConfig::text(TextConfig::new("Living room")),
//!     ElementConfig::sequence(5000, vec![
//!         ElementConfig::text(TextConfig::new("21.5 C")),
//!         ElementConfig::text(TextConfig::new("48 %")),
//!     ]),
//! ]);
//! let (mut tree, root) = ElementTree::from_config(&layout)?;
//! ```

use alloc::vec::Vec;
use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::elements::{ElementId, ElementKind, ScrollMode, TextElement};
use crate::elements::text::{DEFAULT_SCROLL_SPEED, DEFAULT_UPDATE_INTERVAL};
use crate::error::ElementError;
use crate::geometry::Anchor;
use crate::style::{TextAlign, TextSize, rgb};
use crate::tree::ElementTree;

/// 8-bit-per-channel color as stored in configuration.
pub type RgbTriple = (u8, u8, u8);

/// Text element settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct TextConfig<'a> {
    /// Fixed text. `None` leaves the element waiting for a producer.
    pub text: Option<&'a str>,
    pub size: TextSize,
    pub color: RgbTriple,
    pub background_color: RgbTriple,
    pub anchor: Anchor,
    pub align: TextAlign,
    pub scroll_mode: ScrollMode,
    /// Pixels per second
    pub scroll_speed: f32,
    pub update_interval_ms: u32,
}

impl<'a> TextConfig<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    /// Text filled in later by a producer.
    pub fn dynamic() -> Self {
        Self::default()
    }

    fn build(&self) -> Result<TextElement, ElementError> {
        let (r, g, b) = self.color;
        let (br, bg, bb) = self.background_color;

        let mut element = TextElement::new()
            .with_size(self.size)
            .with_color(rgb(r, g, b))
            .with_background_color(rgb(br, bg, bb))
            .with_anchor(self.anchor)
            .with_align(self.align)
            .with_scroll(self.scroll_mode, self.scroll_speed)
            .with_update_interval(Duration::from_millis(self.update_interval_ms as u64));

        if let Some(text) = self.text {
            element.set_text(text)?;
        }
        Ok(element)
    }
}

impl Default for TextConfig<'_> {
    fn default() -> Self {
        Self {
            text: None,
            size: TextSize::default(),
            color: (255, 255, 255),
            background_color: (0, 0, 0),
            anchor: Anchor::default(),
            align: TextAlign::default(),
            scroll_mode: ScrollMode::None,
            scroll_speed: DEFAULT_SCROLL_SPEED,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL.as_millis() as u32,
        }
    }
}

/// Kind-specific part of a layout node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub enum NodeConfig<'a> {
    Overlay(Vec<ElementConfig<'a>>),
    Horizontal(Vec<ElementConfig<'a>>),
    Vertical(Vec<ElementConfig<'a>>),
    Sequence {
        duration_ms: u32,
        children: Vec<ElementConfig<'a>>,
    },
    Text(TextConfig<'a>),
}

/// One node of a layout description.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct ElementConfig<'a> {
    pub node: NodeConfig<'a>,
    /// Whether sequences may rotate onto this element
    pub active: bool,
}

impl<'a> ElementConfig<'a> {
    pub fn new(node: NodeConfig<'a>) -> Self {
        Self { node, active: true }
    }

    pub fn overlay(children: Vec<ElementConfig<'a>>) -> Self {
        Self::new(NodeConfig::Overlay(children))
    }

    pub fn horizontal(children: Vec<ElementConfig<'a>>) -> Self {
        Self::new(NodeConfig::Horizontal(children))
    }

    pub fn vertical(children: Vec<ElementConfig<'a>>) -> Self {
        Self::new(NodeConfig::Vertical(children))
    }

    pub fn sequence(duration_ms: u32, children: Vec<ElementConfig<'a>>) -> Self {
        Self::new(NodeConfig::Sequence {
            duration_ms,
            children,
        })
    }

    pub fn text(text: TextConfig<'a>) -> Self {
        Self::new(NodeConfig::Text(text))
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

impl ElementTree {
    /// Build, wire and validate a tree from a layout description.
    ///
    /// Returns the tree with `config` installed as its root.
    pub fn from_config(config: &ElementConfig<'_>) -> Result<(Self, ElementId), ElementError> {
        let mut tree = Self::new();
        let root = tree.insert_config(config)?;
        tree.set_root(root)?;
        Ok((tree, root))
    }

    /// Decode a postcard-encoded [`ElementConfig`] and build it.
    pub fn from_postcard(bytes: &[u8]) -> Result<(Self, ElementId), ElementError> {
        let config: ElementConfig<'_> =
            postcard::from_bytes(bytes).map_err(|_| ElementError::Decode)?;
        Self::from_config(&config)
    }

    /// Insert the subtree described by `config` without attaching it.
    pub fn insert_config(&mut self, config: &ElementConfig<'_>) -> Result<ElementId, ElementError> {
        let (kind, children) = match &config.node {
            NodeConfig::Overlay(children) => (ElementKind::overlay(), children.as_slice()),
            NodeConfig::Horizontal(children) => (ElementKind::horizontal(), children.as_slice()),
            NodeConfig::Vertical(children) => (ElementKind::vertical(), children.as_slice()),
            NodeConfig::Sequence {
                duration_ms,
                children,
            } => (
                ElementKind::sequence(Duration::from_millis(*duration_ms as u64)),
                children.as_slice(),
            ),
            NodeConfig::Text(text) => (ElementKind::Text(text.build()?), &[][..]),
        };

        let id = self.insert(kind)?;
        self.set_active(id, config.active)?;
        for child in children {
            let child_id = self.insert_config(child)?;
            self.add_child(id, child_id)?;
        }
        Ok(id)
    }
}

/// Serialize a layout into a postcard blob.
pub fn to_postcard(config: &ElementConfig<'_>) -> Result<Vec<u8>, ElementError> {
    postcard::to_allocvec(config).map_err(|_| ElementError::Encode)
}
