//! Text element: static or computed text, anchored, optionally scrolling.
//!
//! Each frame runs a short pipeline:
//!
//! 1. **Resolve** - a dynamic producer is re-run when nothing is cached yet or
//!    the update interval elapsed. Only an actual change requests measurement.
//! 2. **Guard** - without text nothing is drawn and a warning is logged.
//! 3. **Place** - the anchor is resolved against the surface size.
//! 4. **Scroll** - the accumulated scroll offset moves the point along the
//!    scroll axis (and always forces a measurement).
//! 5. **Measure** - the bounding box is recomputed only when requested.
//! 6. **Wrap** - once the box has left the surface the offset resets and the
//!    element reports [`DrawOutcome::Next`].
//! 7. **Paint**.

use alloc::boxed::Box;
use embassy_time::{Duration, Instant};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::Text;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::DrawOutcome;
use crate::error::ElementError;
use crate::geometry::Anchor;
use crate::style::{HorizontalAlign, TextAlign, TextSize, VerticalAlign};
use crate::time::{Frame, Timer};

/// Maximum text length in bytes.
pub const MAX_TEXT_LEN: usize = 128;

/// Default refresh interval for dynamic text.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

/// Default scroll speed in pixels per second.
pub const DEFAULT_SCROLL_SPEED: f32 = 10.0;

pub type TextBuf = heapless::String<MAX_TEXT_LEN>;

/// Producer of dynamic text.
///
/// Producers may read external state but must not touch the element tree.
pub type TextFn = Box<dyn FnMut() -> TextBuf>;

/// Where an element's text comes from. Fixed and dynamic text are exclusive.
pub enum TextSource {
    Fixed(TextBuf),
    Dynamic {
        producer: TextFn,
        /// Last produced value, cleared whenever the element is shown
        cached: Option<TextBuf>,
    },
}

impl TextSource {
    /// Text to draw right now, if any.
    pub fn current(&self) -> Option<&str> {
        match self {
            TextSource::Fixed(text) => Some(text.as_str()),
            TextSource::Dynamic { cached, .. } => cached.as_deref(),
        }
    }
}

/// Direction the text travels while scrolling.
///
/// Every mode starts the text just outside the surface on the side opposite
/// to its travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScrollMode {
    #[default]
    None,
    /// Enters from the right edge, x decreases
    Left,
    /// Enters from the left edge, x increases
    Right,
    /// Enters from the bottom edge, y decreases
    Up,
    /// Enters from the top edge, y increases
    Down,
}

/// Convert a `&str` into a bounded text buffer.
pub fn text_buf(text: &str) -> Result<TextBuf, ElementError> {
    let mut buf = TextBuf::new();
    buf.push_str(text)
        .map_err(|_| ElementError::TextTooLong { max: MAX_TEXT_LEN })?;
    Ok(buf)
}

/// Anchored text with optional periodic refresh and scrolling.
///
/// # Examples
/// ```ignore
/// let banner = TextElement::new()
///     .with_text("Filter replacement due")?
///     .with_size(TextSize::Large)
///     .with_scroll(ScrollMode::Left, 40.0);
///
/// let clock = TextElement::new()
///     .with_lambda(|| uptime_text())
///     .with_anchor(Anchor::CENTER)
///     .with_align(TextAlign::CENTER);
/// ```
pub struct TextElement {
    font: &'static MonoFont<'static>,
    color: Rgb565,
    background_color: Rgb565,
    anchor: Anchor,
    align: TextAlign,

    scroll_mode: ScrollMode,
    scroll_speed: f32,
    scroll_offset: f32,

    update_timer: Timer,
    source: Option<TextSource>,
    last_update: Option<Instant>,

    request_measurement: bool,
    bounds: Rectangle,
}

impl Default for TextElement {
    fn default() -> Self {
        Self::new()
    }
}

impl TextElement {
    pub fn new() -> Self {
        Self {
            font: TextSize::Medium.font(),
            color: Rgb565::WHITE,
            background_color: Rgb565::BLACK,
            anchor: Anchor::default(),
            align: TextAlign::default(),
            scroll_mode: ScrollMode::None,
            scroll_speed: DEFAULT_SCROLL_SPEED,
            scroll_offset: 0.0,
            update_timer: Timer::new(DEFAULT_UPDATE_INTERVAL),
            source: None,
            last_update: None,
            request_measurement: false,
            bounds: Rectangle::zero(),
        }
    }

    pub fn with_text(mut self, text: &str) -> Result<Self, ElementError> {
        self.set_text(text)?;
        Ok(self)
    }

    pub fn with_lambda<F>(mut self, producer: F) -> Self
    where
        F: FnMut() -> TextBuf + 'static,
    {
        self.set_lambda(producer);
        self
    }

    pub fn with_font(mut self, font: &'static MonoFont<'static>) -> Self {
        self.set_font(font);
        self
    }

    pub fn with_size(self, size: TextSize) -> Self {
        self.with_font(size.font())
    }

    pub fn with_color(mut self, color: Rgb565) -> Self {
        self.color = color;
        self
    }

    pub fn with_background_color(mut self, color: Rgb565) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.set_anchor(anchor);
        self
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.set_align(align);
        self
    }

    pub fn with_scroll(mut self, mode: ScrollMode, speed: f32) -> Self {
        self.set_scroll_mode(mode);
        self.set_scroll_speed(speed);
        self
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.set_update_interval(interval);
        self
    }

    /// Show fixed text, replacing any producer.
    pub fn set_text(&mut self, text: &str) -> Result<(), ElementError> {
        self.source = Some(TextSource::Fixed(text_buf(text)?));
        self.scroll_offset = 0.0;
        self.request_measurement = true;
        Ok(())
    }

    /// Compute the text with `producer`, replacing any fixed text.
    ///
    /// The producer runs on the next draw and then once per update interval.
    pub fn set_lambda<F>(&mut self, producer: F)
    where
        F: FnMut() -> TextBuf + 'static,
    {
        self.source = Some(TextSource::Dynamic {
            producer: Box::new(producer),
            cached: None,
        });
        self.scroll_offset = 0.0;
        self.request_measurement = true;
    }

    pub fn set_font(&mut self, font: &'static MonoFont<'static>) {
        self.font = font;
        self.request_measurement = true;
    }

    pub fn set_color(&mut self, color: Rgb565) {
        self.color = color;
    }

    pub fn set_background_color(&mut self, color: Rgb565) {
        self.background_color = color;
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
        self.request_measurement = true;
    }

    pub fn set_align(&mut self, align: TextAlign) {
        self.align = align;
        self.request_measurement = true;
    }

    /// Change the scroll direction. Scrolling restarts from the anchor.
    pub fn set_scroll_mode(&mut self, mode: ScrollMode) {
        self.scroll_mode = mode;
        self.scroll_offset = 0.0;
        self.request_measurement = true;
    }

    /// Scroll speed in pixels per second.
    pub fn set_scroll_speed(&mut self, speed: f32) {
        self.scroll_speed = speed;
    }

    pub fn set_update_interval(&mut self, interval: Duration) {
        self.update_timer.set_duration(interval);
    }

    /// Text that will be drawn, `None` until a producer has run.
    pub fn text(&self) -> Option<&str> {
        self.source.as_ref().and_then(TextSource::current)
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn align(&self) -> TextAlign {
        self.align
    }

    pub fn scroll_mode(&self) -> ScrollMode {
        self.scroll_mode
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// When the producer last ran.
    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    /// Bounding box from the last measurement, `None` while it is stale.
    pub fn measured_bounds(&self) -> Option<Rectangle> {
        if self.request_measurement {
            None
        } else {
            Some(self.bounds)
        }
    }

    /// Reset per-visit state: refetch dynamic text and restart scrolling just
    /// outside the entry edge.
    pub fn on_show(&mut self) {
        if let Some(TextSource::Dynamic { cached, .. }) = &mut self.source {
            *cached = None;
        }

        match self.scroll_mode {
            ScrollMode::None => return,
            ScrollMode::Left => {
                self.anchor.fraction.x = 1.0;
                self.align.horizontal = HorizontalAlign::Left;
            }
            ScrollMode::Right => {
                self.anchor.fraction.x = 0.0;
                self.align.horizontal = HorizontalAlign::Right;
            }
            ScrollMode::Up => {
                self.anchor.fraction.y = 1.0;
                self.align.vertical = VerticalAlign::Top;
            }
            ScrollMode::Down => {
                self.anchor.fraction.y = 0.0;
                self.align.vertical = VerticalAlign::Bottom;
            }
        }
        self.scroll_offset = 0.0;
        self.request_measurement = true;
    }

    /// Run the draw pipeline against `display`.
    pub fn draw<D>(&mut self, frame: &Frame, display: &mut D) -> Result<DrawOutcome, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.refresh(frame.now);

        let Some(text) = self.source.as_ref().and_then(TextSource::current) else {
            warn!("Missing text");
            return Ok(DrawOutcome::Continue);
        };

        let size = display.bounding_box().size;
        let mut point = self.anchor.resolve(size);

        if self.scroll_mode != ScrollMode::None {
            self.scroll_offset += frame.delta.as_millis() as f32 * self.scroll_speed / 1000.0;
            let offset = self.scroll_offset;
            match self.scroll_mode {
                ScrollMode::None => {}
                ScrollMode::Left => point.x = (point.x as f32 - offset) as i32,
                ScrollMode::Right => point.x = (point.x as f32 + offset) as i32,
                ScrollMode::Up => point.y = (point.y as f32 - offset) as i32,
                ScrollMode::Down => point.y = (point.y as f32 + offset) as i32,
            }
            self.request_measurement = true;
        }

        let character_style = self.character_style();
        let label = Text::with_text_style(text, point, character_style, self.align.text_style());

        if self.request_measurement {
            self.bounds = label.bounding_box();
            self.request_measurement = false;
        }

        // Both axes are checked whatever the scroll direction.
        let mut outcome = DrawOutcome::Continue;
        if self.scroll_mode != ScrollMode::None && has_left(self.bounds, size) {
            self.scroll_offset = 0.0;
            outcome = DrawOutcome::Next;
        }

        label.draw(display)?;
        Ok(outcome)
    }

    /// Re-run the producer when due. Returns whether the text changed.
    fn refresh(&mut self, now: Instant) -> bool {
        let Some(TextSource::Dynamic { producer, cached }) = &mut self.source else {
            return false;
        };

        if cached.is_some() && !self.update_timer.check(now) {
            return false;
        }

        let text = producer();
        self.update_timer.reset(now);
        self.last_update = Some(now);

        if cached.as_ref() == Some(&text) {
            return false;
        }

        debug!("Text has changed: {}", text);
        *cached = Some(text);
        self.request_measurement = true;
        true
    }

    fn character_style(&self) -> MonoTextStyle<'static, Rgb565> {
        MonoTextStyleBuilder::new()
            .font(self.font)
            .text_color(self.color)
            .background_color(self.background_color)
            .build()
    }
}

/// Whether `bounds` lies entirely outside a surface of `size`.
fn has_left(bounds: Rectangle, size: Size) -> bool {
    let left = bounds.top_left.x;
    let top = bounds.top_left.y;
    let right = left + bounds.size.width as i32;
    let bottom = top + bounds.size.height as i32;

    right < 0 || (size.width as i32) < left || bottom < 0 || (size.height as i32) < top
}
