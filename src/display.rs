//! Clipped, offset views of a draw target.
//!
//! Containers hand each child a [`SubDisplay`] restricted to the child's
//! region. The child draws in local coordinates starting at `(0, 0)` and never
//! learns its absolute position.
//!
//! Nesting a view inside a view yields the same `SubDisplay<'_, D>` type, with
//! the areas composed, so recursive drawing over arbitrarily deep trees does
//! not grow the draw target type.

use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A rectangular window into a root draw target.
pub struct SubDisplay<'a, D> {
    target: &'a mut D,
    /// Absolute area in root target coordinates
    area: Rectangle,
}

impl<'a, D> SubDisplay<'a, D>
where
    D: DrawTarget,
{
    /// View covering the whole target.
    pub fn new(target: &'a mut D) -> Self {
        let area = target.bounding_box();
        Self { target, area }
    }

    /// Absolute area of this view in root target coordinates.
    pub fn area(&self) -> Rectangle {
        self.area
    }

    /// Narrow the view to `area`, given relative to this view's origin.
    ///
    /// The result is clipped to this view, so a child can never draw outside
    /// its parent's region.
    pub fn sub_display(&mut self, area: Rectangle) -> SubDisplay<'_, D> {
        let absolute = Rectangle::new(self.area.top_left + area.top_left, area.size);
        SubDisplay {
            area: absolute.intersection(&self.area),
            target: &mut *self.target,
        }
    }
}

impl<D> OriginDimensions for SubDisplay<'_, D> {
    fn size(&self) -> Size {
        self.area.size
    }
}

impl<C, D> DrawTarget for SubDisplay<'_, D>
where
    C: PixelColor,
    D: DrawTarget<Color = C>,
{
    type Color = C;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let area = self.area;
        let origin = area.top_left;

        self.target.draw_iter(
            pixels
                .into_iter()
                .map(move |Pixel(point, color)| Pixel(point + origin, color))
                .filter(move |Pixel(point, _)| area.contains(*point)),
        )
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let absolute = Rectangle::new(area.top_left + self.area.top_left, area.size);
        let clipped = absolute.intersection(&self.area);
        if clipped.is_zero_sized() {
            return Ok(());
        }
        self.target.fill_solid(&clipped, color)
    }
}
