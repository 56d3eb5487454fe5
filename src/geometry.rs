//! Integer pixel geometry on the virtual desktop.
//!
//! All coordinates are virtual-desktop pixels.  Rectangles use exclusive
//! `right`/`bottom` bounds, so `width = right - left`.

use crate::command::DisplayInfo;

/// One of the two screen axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A point on the virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle with exclusive right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build a rectangle from its origin and size.
    pub fn from_origin_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Extent of the rectangle along `axis`.
    pub fn extent(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.width(),
            Axis::Vertical => self.height(),
        }
    }

    /// The leading edge along `axis` (`left` or `top`).
    pub fn start(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    /// The trailing, exclusive edge along `axis` (`right` or `bottom`).
    pub fn end(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.right,
            Axis::Vertical => self.bottom,
        }
    }

    pub fn set_start(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Horizontal => self.left = value,
            Axis::Vertical => self.top = value,
        }
    }

    pub fn set_end(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Horizontal => self.right = value,
            Axis::Vertical => self.bottom = value,
        }
    }

    /// Whether `p` lies inside the rectangle (right/bottom exclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Midpoint, rounded toward zero.
    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    /// Squared distance from `p` to the closest point of the rectangle;
    /// `0` when `p` is inside.
    pub fn distance_sq(&self, p: Point) -> i64 {
        let dx = if p.x < self.left {
            i64::from(self.left) - i64::from(p.x)
        } else if p.x >= self.right {
            i64::from(p.x) - i64::from(self.right) + 1
        } else {
            0
        };
        let dy = if p.y < self.top {
            i64::from(self.top) - i64::from(p.y)
        } else if p.y >= self.bottom {
            i64::from(p.y) - i64::from(self.bottom) + 1
        } else {
            0
        };
        dx * dx + dy * dy
    }
}

/// The invisible frame a window draws around its visible footprint.
///
/// Each field is `reported edge - visible edge`, so subtracting a margin from
/// a reported edge yields the visible edge and adding it back converts a
/// visible target into the rectangle the platform expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    pub const ZERO: Self = Self {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    /// Margins between the rectangle a platform reports for a window and the
    /// window's visible `frame`.
    pub fn between(reported: Rect, frame: Rect) -> Self {
        Self {
            left: reported.left - frame.left,
            top: reported.top - frame.top,
            right: reported.right - frame.right,
            bottom: reported.bottom - frame.bottom,
        }
    }

    pub fn start(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    pub fn end(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.right,
            Axis::Vertical => self.bottom,
        }
    }
}

/// Resolve the display owning `point`.
///
/// Returns the display whose usable area contains the point; if none does,
/// the display whose area lies closest to it.  Ties keep the earliest entry.
/// A point just past the outermost edge of the desktop therefore resolves to
/// the outermost display itself, never to `None` unless `displays` is empty.
pub fn nearest_display(displays: &[DisplayInfo], point: Point) -> Option<&DisplayInfo> {
    if let Some(d) = displays.iter().find(|d| d.area.contains(point)) {
        return Some(d);
    }
    displays.iter().min_by_key(|d| d.area.distance_sq(point))
}
