//! Text styling primitives: font presets, alignment and colors.

use embedded_graphics::mono_font::{MonoFont, ascii};
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::text::{Alignment, Baseline, TextStyle, TextStyleBuilder};
use serde::{Deserialize, Serialize};

/// Text size variants
///
/// Provides three preset text sizes with corresponding embedded-graphics fonts:
/// - `Small`: 5x8 font
/// - `Medium`: 6x10 font (default)
/// - `Large`: 10x20 font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl TextSize {
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &ascii::FONT_5X8,
            TextSize::Medium => &ascii::FONT_6X10,
            TextSize::Large => &ascii::FONT_10X20,
        }
    }
}

/// Where the anchor point sits horizontally relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Where the anchor point sits vertically relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerticalAlign {
    #[default]
    Top,
    Center,
    Baseline,
    Bottom,
}

/// Independent horizontal and vertical text alignment.
///
/// Scrolling text rewrites only the field of the axis it travels along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextAlign {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

impl TextAlign {
    pub const TOP_LEFT: TextAlign = TextAlign::new(HorizontalAlign::Left, VerticalAlign::Top);
    pub const CENTER: TextAlign = TextAlign::new(HorizontalAlign::Center, VerticalAlign::Center);

    pub const fn new(horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// embedded-graphics text style for this alignment.
    pub fn text_style(&self) -> TextStyle {
        TextStyleBuilder::new()
            .alignment(self.horizontal.into())
            .baseline(self.vertical.into())
            .build()
    }
}

impl From<HorizontalAlign> for Alignment {
    fn from(align: HorizontalAlign) -> Self {
        match align {
            HorizontalAlign::Left => Alignment::Left,
            HorizontalAlign::Center => Alignment::Center,
            HorizontalAlign::Right => Alignment::Right,
        }
    }
}

impl From<VerticalAlign> for Baseline {
    fn from(align: VerticalAlign) -> Self {
        match align {
            VerticalAlign::Top => Baseline::Top,
            VerticalAlign::Center => Baseline::Middle,
            VerticalAlign::Baseline => Baseline::Alphabetic,
            VerticalAlign::Bottom => Baseline::Bottom,
        }
    }
}

/// Convert an 8-bit-per-channel RGB triple to the panel's color format.
pub fn rgb(red: u8, green: u8, blue: u8) -> Rgb565 {
    Rgb565::from(Rgb888::new(red, green, blue))
}
