//! Geometry primitives shared by every window component
//!
//! All coordinates are physical pixels in root (virtual screen) space. Sizes that
//! are "logical" (device independent) are always `f32` and carried separately.

use serde::{Deserialize, Serialize};

/// DPI at which one logical unit equals one physical pixel
pub const USER_DEFAULT_DPI: u32 = 96;

/// A point in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl std::ops::Add for Size {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.width + other.width, self.height + other.height)
    }
}

/// Window rectangle, edges inclusive on left/top and exclusive on right/bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Build from an origin and a size
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x + size.width,
            bottom: origin.y + size.height,
        }
    }

    /// Shorthand for `x, y, width, height` construction
    pub fn xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::from_origin_size(Point::new(x, y), Size::new(width, height))
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Translate by `dx`, `dy`
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    /// Grow outward by `dx` on the left and right, `dy` on the top and bottom
    pub fn inflate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.left - dx, self.top - dy, self.right + dx, self.bottom + dy)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// Area of the overlap between two rectangles (0 when disjoint)
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let w = (self.right.min(other.right) - self.left.max(other.left)).max(0) as i64;
        let h = (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0) as i64;
        w * h
    }

    /// Overlap of two rectangles, `None` when they do not overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (!r.is_empty()).then_some(r)
    }

    /// Squared distance from `point` to the closest point of this rectangle
    pub fn distance_sq_to(&self, point: Point) -> i64 {
        let dx = if point.x < self.left {
            self.left - point.x
        } else if point.x >= self.right {
            point.x - (self.right - 1)
        } else {
            0
        } as i64;
        let dy = if point.y < self.top {
            self.top - point.y
        } else if point.y >= self.bottom {
            point.y - (self.bottom - 1)
        } else {
            0
        } as i64;
        dx * dx + dy * dy
    }

    /// Squared gap between two rectangles (0 when they touch or overlap)
    pub fn distance_sq_to_rect(&self, other: &Rect) -> i64 {
        let dx = (other.left - self.right).max(self.left - other.right).max(0) as i64;
        let dy = (other.top - self.bottom).max(self.top - other.bottom).max(0) as i64;
        dx * dx + dy * dy
    }
}

/// A rectangle together with the DPI it was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub rect: Rect,
    pub dpi: u32,
}

impl WindowGeometry {
    pub fn new(rect: Rect, dpi: u32) -> Self {
        Self { rect, dpi }
    }
}

/// `a * b / c` computed in 64 bits and rounded half away from zero
///
/// Returns -1 when `c` is zero.
pub fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    if c == 0 {
        return -1;
    }
    let num = a as i64 * b as i64;
    let den = c as i64;
    let negative = (num < 0) != (den < 0);
    let (num, den) = (num.abs(), den.abs());
    let q = (num + den / 2) / den;
    let q = if negative { -q } else { q };
    q.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Scale a value expressed at 96 DPI to `dpi`
pub fn scale_for_dpi(value: i32, dpi: u32) -> i32 {
    mul_div(value, dpi as i32, USER_DEFAULT_DPI as i32)
}

/// Physical pixels per logical unit at `dpi`
pub fn px_per_dip(dpi: u32) -> f32 {
    dpi as f32 / USER_DEFAULT_DPI as f32
}
