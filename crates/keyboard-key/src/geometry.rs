//! Key geometry
//!
//! Screen-space points and rectangles used for hit testing, plus the
//! ratio-based metrics a renderer uses to draw a key of a given size.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A location in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width and height
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Smaller of the two dimensions
    pub fn min_dimension(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    /// Half-open containment: the origin edges belong to the rectangle,
    /// the far edges do not. Empty rectangles contain nothing.
    pub fn contains(&self, p: Point) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && p.x >= self.x
            && p.x < self.max_x()
            && p.y >= self.y
            && p.y < self.max_y()
    }
}

/// Edge of the key the label is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Keys hang down, label at the bottom (horizontal keyboards)
    #[default]
    Bottom,
    /// Keys point right, label at the trailing edge (vertical keyboards)
    Trailing,
}

impl FromStr for Alignment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bottom" => Ok(Alignment::Bottom),
            "trailing" => Ok(Alignment::Trailing),
            _ => Err(Error::InvalidAlignment(s.to_string())),
        }
    }
}

/// How much of the key's smaller dimension the label font takes up
const RELATIVE_FONT_SIZE: f32 = 0.333;

const RELATIVE_CORNER_RADIUS: f32 = 0.125;

/// Hairline gap that separates adjacent white keys
const KEY_GAP: f32 = 0.5;

/// Drawing metrics for one key
///
/// With `flat_top` the rounded rectangle is pushed past the anchored edge
/// by one corner radius and clipped, so only the far corners show rounding.
/// The border is stroked along the full key outline, independent of the fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyMetrics {
    pub size: Size,
    pub flat_top: bool,
    pub alignment: Alignment,
    pub is_white: bool,
    /// Stroke width of the key outline; zero draws no border
    pub border_width: f32,
}

impl KeyMetrics {
    pub fn new(size: Size, flat_top: bool, alignment: Alignment, is_white: bool) -> Self {
        Self { size, flat_top, alignment, is_white, border_width: 0.0 }
    }

    /// Same metrics with an outline of `width` (negative widths count as zero)
    pub fn with_border_width(self, width: f32) -> Self {
        Self { border_width: width.max(0.0), ..self }
    }

    pub fn has_border(&self) -> bool {
        self.border_width > 0.0
    }

    /// The stroke is centered on the outline inset by half its width, so it
    /// covers a band of `border_width` inside the key bounds
    pub fn border_inset(&self) -> f32 {
        self.border_width / 2.0
    }

    /// Path the border stroke follows
    pub fn border_rect(&self, bounds: Rect) -> Rect {
        let inset = self.border_inset();
        Rect::new(
            bounds.x + inset,
            bounds.y + inset,
            (bounds.width - self.border_width).max(0.0),
            (bounds.height - self.border_width).max(0.0),
        )
    }

    /// Visible fill after the top, leading and trailing paddings
    pub fn fill_rect(&self, bounds: Rect) -> Rect {
        let top = self.top_padding() + self.negative_top_padding();
        let leading = self.leading_padding() + self.negative_leading_padding();
        Rect::new(
            bounds.x + leading,
            bounds.y + top,
            (bounds.width - leading - self.trailing_padding()).max(0.0),
            (bounds.height - top).max(0.0),
        )
    }

    pub fn is_tall(&self) -> bool {
        self.size.height > self.size.width
    }

    pub fn font_size(&self) -> f32 {
        self.size.min_dimension() * RELATIVE_FONT_SIZE
    }

    /// Padding around the label text
    pub fn text_padding(&self) -> f32 {
        self.font_size() / 3.0
    }

    pub fn corner_radius(&self) -> f32 {
        self.size.min_dimension() * RELATIVE_CORNER_RADIUS
    }

    pub fn top_padding(&self) -> f32 {
        if self.flat_top && self.alignment == Alignment::Bottom {
            self.corner_radius()
        } else {
            0.0
        }
    }

    pub fn leading_padding(&self) -> f32 {
        if self.flat_top && self.alignment == Alignment::Trailing {
            self.corner_radius()
        } else {
            0.0
        }
    }

    pub fn negative_top_padding(&self) -> f32 {
        if self.flat_top && self.alignment == Alignment::Bottom {
            -self.corner_radius()
        } else if self.is_white {
            KEY_GAP
        } else {
            0.0
        }
    }

    pub fn negative_leading_padding(&self) -> f32 {
        if self.flat_top && self.alignment == Alignment::Trailing {
            -self.corner_radius()
        } else if self.is_white {
            KEY_GAP
        } else {
            0.0
        }
    }

    /// Trailing padding is a constant hairline on every key
    pub fn trailing_padding(&self) -> f32 {
        KEY_GAP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_half_open() {
        let r = Rect::new(10.0, 20.0, 5.0, 8.0);
        assert!(r.contains(Point::new(10.0, 20.0)));
        assert!(r.contains(Point::new(14.9, 27.9)));
        assert!(!r.contains(Point::new(15.0, 22.0)));
        assert!(!r.contains(Point::new(12.0, 28.0)));
        assert!(!r.contains(Point::new(9.9, 22.0)));
        assert!(!Rect::new(0.0, 0.0, 0.0, 10.0).contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_ratio_metrics() {
        let m = KeyMetrics::new(Size::new(40.0, 160.0), false, Alignment::Bottom, true);
        assert!(m.is_tall());
        assert!((m.font_size() - 13.32).abs() < 1e-4);
        assert!((m.text_padding() - 4.44).abs() < 1e-4);
        assert_eq!(m.corner_radius(), 5.0);
    }

    #[test]
    fn test_flat_top_paddings() {
        let size = Size::new(40.0, 160.0);

        let bottom = KeyMetrics::new(size, true, Alignment::Bottom, true);
        assert_eq!(bottom.top_padding(), 5.0);
        assert_eq!(bottom.negative_top_padding(), -5.0);
        assert_eq!(bottom.leading_padding(), 0.0);
        assert_eq!(bottom.negative_leading_padding(), 0.5);

        let trailing = KeyMetrics::new(size, true, Alignment::Trailing, false);
        assert_eq!(trailing.leading_padding(), 5.0);
        assert_eq!(trailing.negative_leading_padding(), -5.0);
        assert_eq!(trailing.top_padding(), 0.0);
        assert_eq!(trailing.negative_top_padding(), 0.0);
    }

    #[test]
    fn test_fill_rect() {
        let bounds = Rect::new(10.0, 0.0, 40.0, 160.0);
        let size = bounds.size();

        // Rounded white key: hairline on top, leading and trailing
        let white = KeyMetrics::new(size, false, Alignment::Bottom, true);
        assert_eq!(white.fill_rect(bounds), Rect::new(10.5, 0.5, 39.0, 159.5));

        // Flat top cancels out on the anchored edge
        let flat = KeyMetrics::new(size, true, Alignment::Bottom, false);
        assert_eq!(flat.fill_rect(bounds), Rect::new(10.0, 0.0, 39.5, 160.0));
    }

    #[test]
    fn test_border() {
        let bounds = Rect::new(0.0, 0.0, 40.0, 160.0);
        let plain = KeyMetrics::new(bounds.size(), false, Alignment::Bottom, true);
        assert!(!plain.has_border());

        let outlined = plain.with_border_width(2.0);
        assert!(outlined.has_border());
        assert_eq!(outlined.border_inset(), 1.0);
        assert_eq!(outlined.border_rect(bounds), Rect::new(1.0, 1.0, 38.0, 158.0));

        assert_eq!(plain.with_border_width(-3.0).border_width, 0.0);
    }

    #[test]
    fn test_alignment_names() {
        assert_eq!("Trailing".parse::<Alignment>().unwrap(), Alignment::Trailing);
        assert_eq!(" bottom".parse::<Alignment>().unwrap(), Alignment::Bottom);
        assert!("left".parse::<Alignment>().is_err());
    }

    #[test]
    fn test_rounded_top_paddings() {
        let size = Size::new(40.0, 160.0);
        let white = KeyMetrics::new(size, false, Alignment::Bottom, true);
        let black = KeyMetrics::new(size, false, Alignment::Bottom, false);
        assert_eq!(white.top_padding(), 0.0);
        assert_eq!(white.negative_top_padding(), 0.5);
        assert_eq!(black.negative_top_padding(), 0.0);
        assert_eq!(black.trailing_padding(), 0.5);
    }
}
