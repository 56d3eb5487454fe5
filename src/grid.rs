//! Per-display grid layout.
//!
//! A [`ScreenGrid`] partitions one display's usable area into a uniform
//! `cols × rows` grid.  Cells are `area / count` pixels wide or tall; the
//! leftover `area % count` pixels (the *odd* column or row) belong to the
//! last cell on each axis and are never a snap target of their own.
//!
//! [`GridRegistry`] owns one grid per [`DisplayId`].  Grids are created the
//! first time a display is seen and live for the rest of the process.

use crate::command::{DisplayId, DisplayInfo};
use crate::geometry::{Axis, Rect};
use log::info;
use std::collections::HashMap;
use std::num::NonZeroU32;

/// Row count a grid is reset to.
pub const DEFAULT_ROWS: i32 = 3;
/// Column count a grid is reset to.
pub const DEFAULT_COLS: i32 = 3;

/// Grid layout of a single display.
///
/// Derived cell sizes and remainders are recomputed whenever the area, the
/// row count or the column count changes, so that
/// `cell_width * cols + odd_col == area.width()` always holds (likewise for
/// rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenGrid {
    area: Rect,
    rows: i32,
    cols: i32,
    cell_width: i32,
    cell_height: i32,
    odd_col: i32,
    odd_row: i32,
}

impl ScreenGrid {
    /// An uninitialised grid.  The first [`refresh`](Self::refresh) resets it.
    pub fn new() -> Self {
        Self::default()
    }

    //  Accessors

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn cell_width(&self) -> i32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> i32 {
        self.cell_height
    }

    pub fn odd_col(&self) -> i32 {
        self.odd_col
    }

    pub fn odd_row(&self) -> i32 {
        self.odd_row
    }

    /// Whether the grid has been reset at least once.
    pub fn is_initialized(&self) -> bool {
        self.rows != 0 && self.cols != 0
    }

    /// Cell size along `axis`.
    pub fn cell(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.cell_width,
            Axis::Vertical => self.cell_height,
        }
    }

    /// Leftover pixels along `axis`.
    pub fn odd(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.odd_col,
            Axis::Vertical => self.odd_row,
        }
    }

    /// Number of cells along `axis`.
    pub fn count(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.cols,
            Axis::Vertical => self.rows,
        }
    }

    /// Screen-space coordinate of the area's leading edge along `axis`.
    pub fn origin(&self, axis: Axis) -> i32 {
        self.area.start(axis)
    }

    /// Width or height of the usable area.
    pub fn extent(&self, axis: Axis) -> i32 {
        self.area.extent(axis)
    }

    /// First screen-relative coordinate past the last full cell.
    pub fn limit(&self, axis: Axis) -> i32 {
        self.extent(axis) - self.odd(axis)
    }

    //  Mutation

    /// Bring the grid in line with the display's current usable area.
    ///
    /// Resets the grid to [`DEFAULT_ROWS`] × [`DEFAULT_COLS`] over `area` if
    /// the area changed or the grid was never initialised, and returns
    /// `true`.  Otherwise nothing changes and `false` is returned.
    pub fn refresh(&mut self, area: Rect) -> bool {
        if self.is_initialized() && self.area == area {
            return false;
        }
        self.area = area;
        self.rows = DEFAULT_ROWS;
        self.cols = DEFAULT_COLS;
        self.recompute();
        true
    }

    /// Replace the row count, keeping the current area.
    pub fn set_rows(&mut self, rows: NonZeroU32) {
        self.rows = i32::try_from(rows.get()).unwrap_or(i32::MAX);
        self.recompute();
    }

    /// Replace the column count, keeping the current area.
    pub fn set_cols(&mut self, cols: NonZeroU32) {
        self.cols = i32::try_from(cols.get()).unwrap_or(i32::MAX);
        self.recompute();
    }

    fn recompute(&mut self) {
        let (w, h) = (self.area.width(), self.area.height());
        // A count is still 0 only before the first refresh.
        if self.cols > 0 {
            self.cell_width = w / self.cols;
            self.odd_col = w % self.cols;
        }
        if self.rows > 0 {
            self.cell_height = h / self.rows;
            self.odd_row = h % self.rows;
        }
    }

    //  Cell arithmetic

    /// Position of screen-relative `v` inside its cell along `axis`, in
    /// `[0, cell)`.
    ///
    /// `v` is biased by `count + 1` whole cells before the remainder is taken
    /// and the remainder is Euclidean, so negative coordinates (windows hanging
    /// off the leading edge) land in range too.  A grid whose cells are zero
    /// pixels wide has no interior and reports `0`.
    pub fn offset(&self, axis: Axis, v: i32) -> i32 {
        let cell = i64::from(self.cell(axis));
        if cell <= 0 {
            return 0;
        }
        let biased = i64::from(v) + cell * (i64::from(self.count(axis)) + 1);
        // The result is in [0, cell) and cell fits in i32.
        biased.rem_euclid(cell) as i32
    }

    /// Horizontal [`offset`](Self::offset).
    pub fn x_offset(&self, screen_x: i32) -> i32 {
        self.offset(Axis::Horizontal, screen_x)
    }

    /// Vertical [`offset`](Self::offset).
    pub fn y_offset(&self, screen_y: i32) -> i32 {
        self.offset(Axis::Vertical, screen_y)
    }

    /// Snap `v` to the start of the previous cell.
    ///
    /// The `1 + odd` bias makes a coordinate that already sits on a cell
    /// boundary move to the preceding cell instead of staying put.
    pub fn step_back(&self, axis: Axis, v: i32) -> i32 {
        let v = v - (1 + self.odd(axis));
        v - self.offset(axis, v)
    }

    /// Advance `v` by one cell and snap it to the start of that cell.
    pub fn step_forward(&self, axis: Axis, v: i32) -> i32 {
        let v = v + self.cell(axis);
        v - self.offset(axis, v)
    }

    /// Start of the last full cell, computed by stepping back from just past
    /// the far edge (`extent + bias`).
    pub fn last_cell(&self, axis: Axis, bias: i32) -> i32 {
        self.step_back(axis, self.extent(axis) + bias)
    }
}

/// Grids of every display seen so far, keyed by display identity.
#[derive(Debug, Default)]
pub struct GridRegistry {
    grids: HashMap<DisplayId, ScreenGrid>,
}

impl GridRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the grid for `display`, creating it if needed, and refresh it
    /// against the display's current usable area.
    ///
    /// Returns the grid and whether it was reset.
    pub fn refresh(&mut self, display: &DisplayInfo) -> (&mut ScreenGrid, bool) {
        let grid = self.grids.entry(display.id.clone()).or_default();
        let reset = grid.refresh(display.area);
        if reset {
            info!(
                "grid for {} reset to {}x{} over {:?}",
                display.id,
                grid.cols(),
                grid.rows(),
                display.area
            );
        }
        (grid, reset)
    }

    //  Inspection
    //
    // Read-only views for callers of `PlacementEngine::grids`, e.g. to show
    // the current layout of every display.

    /// Grid of `id` as of its last refresh, without refreshing it.
    pub fn get(&self, id: &DisplayId) -> Option<&ScreenGrid> {
        self.grids.get(id)
    }

    /// Displays that have a grid, in no particular order.
    pub fn displays(&self) -> impl Iterator<Item = &DisplayId> {
        self.grids.keys()
    }

    /// Number of displays that have a grid.
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Whether no display has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

//  Tests
