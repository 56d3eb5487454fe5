//! The placement engine: turns directional commands into window rectangles.
//!
//! [`PlacementEngine`] owns the [`GridRegistry`] and reacts to [`Command`]s
//! by reading the focused window's geometry through the [`WindowManager`]
//! trait, snapping one of its edges to the display grid and writing the
//! result back.
//!
//! All eight commands share one routine per intent.  A [`Direction`] picks the
//! axis and whether coordinates grow (right/down) or shrink (left/up); the
//! grid and rectangle accessors are per-axis, so moving up is moving left on
//! the vertical axis.  Move and resize keep their own edge rules: only a move
//! may hop to the adjacent display, and only an expand checks whether the
//! window is already past the far edge.

use crate::command::{Command, Direction, DisplayId, DisplayInfo, ShowState, WindowId};
use crate::config::Config;
use crate::geometry::{Margins, Point, Rect};
use crate::grid::{GridRegistry, ScreenGrid};
use crate::traits::WindowManager;
use log::{debug, info, warn};
use std::num::NonZeroU32;

/// Possible errors from the engine.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    /// The window manager failed a query the placement cannot do without.
    #[error("window manager error: {0}")]
    WindowManager(String),

    /// The window is in a state that cannot be placed on the grid.
    #[error("cannot place a {0} window")]
    UnexpectedShowState(ShowState),
}

fn wm_error(e: impl std::error::Error) -> PlacementError {
    PlacementError::WindowManager(e.to_string())
}

/// Everything one command needs to know about its window.
#[derive(Debug, Clone)]
struct Placement {
    rect: Rect,
    /// Show-state before the window was restored.
    was_maximized: bool,
    margins: Margins,
    display: DisplayId,
    grid: ScreenGrid,
}

/// Moves and resizes windows on per-display grids.
///
/// The engine is generic over any [`WindowManager`] implementation.  Commands
/// must be delivered one at a time; the engine itself does no locking.
///
/// # Typical usage
///
/// ```ignore
/// let mut engine = PlacementEngine::new(HyprlandWm::new(), Config::default());
/// engine.handle(Command::Move(Direction::Right))?;
/// ```
pub struct PlacementEngine<W: WindowManager> {
    wm: W,
    grids: GridRegistry,
    config: Config,
}

impl<W: WindowManager> PlacementEngine<W> {
    /// Create a new engine.  Grids are created as displays are encountered
    /// and shaped by the layouts in `config`.
    pub fn new(wm: W, config: Config) -> Self {
        Self {
            wm,
            grids: GridRegistry::new(),
            config,
        }
    }

    /// The underlying window manager.
    pub fn wm(&self) -> &W {
        &self.wm
    }

    /// Every grid created so far.
    pub fn grids(&self) -> &GridRegistry {
        &self.grids
    }

    /// Process a single [`Command`] against the focused window.
    ///
    /// Without a focused window the command is a no-op.
    pub fn handle(&mut self, cmd: Command) -> Result<(), PlacementError> {
        info!("{}", cmd);
        let Some(window) = self.wm.active_window().map_err(wm_error)? else {
            debug!("no active window, nothing to place");
            return Ok(());
        };
        match cmd {
            Command::Move(dir) => self.move_window(dir, &window)?,
            Command::Resize(dir) => self.resize_window(dir, &window)?,
        };
        Ok(())
    }

    //  Configuration surface

    /// Fetch the grid for `display`, refreshed against its current area.
    ///
    /// When the refresh resets the grid, the configured layout for the
    /// display is applied on top of the defaults.
    pub fn refresh_grid(&mut self, display: &DisplayInfo) -> ScreenGrid {
        *self.grid_mut(display)
    }

    /// Change the number of rows on `display`.
    ///
    /// The change lasts until the display's usable area changes, at which
    /// point the configured layout is applied again.
    pub fn set_rows(&mut self, display: &DisplayInfo, rows: NonZeroU32) -> ScreenGrid {
        let grid = self.grid_mut(display);
        grid.set_rows(rows);
        *grid
    }

    /// Change the number of columns on `display`.  See [`set_rows`](Self::set_rows).
    pub fn set_cols(&mut self, display: &DisplayInfo, cols: NonZeroU32) -> ScreenGrid {
        let grid = self.grid_mut(display);
        grid.set_cols(cols);
        *grid
    }

    fn grid_mut(&mut self, display: &DisplayInfo) -> &mut ScreenGrid {
        let (grid, reset) = self.grids.refresh(display);
        if reset {
            let layout = self.config.layout_for(&display.id);
            if let Some(rows) = layout.rows {
                grid.set_rows(rows);
            }
            if let Some(cols) = layout.cols {
                grid.set_cols(cols);
            }
            if !layout.is_empty() {
                info!("grid for {} configured as {}x{}", display.id, grid.cols(), grid.rows());
            }
        }
        grid
    }

    //  Operations

    /// Move `window` one grid cell in `dir`.
    ///
    /// The window becomes exactly one cell long along the direction's axis;
    /// the other axis is left alone.  Past the last cell the window moves to
    /// the facing cell of the adjacent display, or stays in the last cell if
    /// there is none.  A maximized window lands in the first (left/up) or
    /// last (right/down) cell of its display.
    ///
    /// Returns the rectangle that was applied.
    pub fn move_window(&mut self, dir: Direction, window: &WindowId) -> Result<Rect, PlacementError> {
        let mut p = self.prepare(window)?;
        let axis = dir.axis();
        let forward = dir.is_forward();
        let m = p.margins;
        let mut grid = p.grid;

        let current = p.rect.start(axis) - m.start(axis) - grid.origin(axis);
        let mut pos = match (forward, p.was_maximized) {
            (false, false) => grid.step_back(axis, current),
            (false, true) => 0,
            (true, false) => grid.step_forward(axis, current),
            (true, true) => grid.last_cell(axis, 0),
        };

        let past_edge = if forward { pos >= grid.limit(axis) } else { pos < 0 };
        if past_edge {
            match self.adjacent_grid(&grid, &p.display, dir) {
                Some(adjacent) => {
                    grid = adjacent;
                    pos = if forward { 0 } else { grid.last_cell(axis, 0) };
                }
                None => {
                    pos = if forward { grid.last_cell(axis, 0) } else { 0 };
                }
            }
        }

        let start = grid.origin(axis) + pos + m.start(axis);
        p.rect.set_start(axis, start);
        p.rect.set_end(axis, start + grid.cell(axis) - m.start(axis) + m.end(axis));
        self.apply(window, p.rect)
    }

    /// Move the right (or bottom) edge of `window` by one grid cell.
    ///
    /// `Left`/`Up` shrink the window, but never below one cell.  `Right`/
    /// `Down` expand it up to the far edge of the display; a window that
    /// already starts past that edge is left alone.  Resizes never cross to
    /// another display.
    ///
    /// Returns the rectangle that was applied, which is unchanged when the
    /// resize had nothing to do.
    pub fn resize_window(&mut self, dir: Direction, window: &WindowId) -> Result<Rect, PlacementError> {
        let mut p = self.prepare(window)?;
        let axis = dir.axis();
        let m = p.margins;
        let grid = p.grid;
        let origin = grid.origin(axis);

        let visible_start = p.rect.start(axis) - m.start(axis);
        let visible_end = p.rect.end(axis) - m.end(axis);
        let end = visible_end - origin;

        let target = if dir.is_forward() {
            let bias = 1 + grid.odd(axis);
            let pos = if p.was_maximized {
                grid.last_cell(axis, bias)
            } else {
                grid.step_forward(axis, end + bias)
            };
            let limit = grid.limit(axis);
            if pos <= limit {
                Some(pos)
            } else if visible_start - origin >= limit {
                debug!("{} is past the {} edge of {}, not expanding", window, dir, p.display);
                None
            } else {
                Some(limit)
            }
        } else {
            let pos = if p.was_maximized {
                grid.last_cell(axis, 0)
            } else {
                grid.step_back(axis, end)
            };
            if visible_end - visible_start <= grid.cell(axis) {
                debug!("{} is already one cell, not shrinking", window);
                None
            } else if origin + pos <= visible_start {
                // The far edge would land on or before the near one.
                debug!("{} has no cell boundary to shrink to", window);
                None
            } else {
                Some(pos)
            }
        };

        if let Some(pos) = target {
            p.rect.set_end(axis, origin + pos + m.end(axis));
        }
        self.apply(window, p.rect)
    }

    //  Internal

    /// Read everything a command needs, restoring a maximized window first.
    fn prepare(&mut self, window: &WindowId) -> Result<Placement, PlacementError> {
        let was_maximized = match self.wm.show_state(window).map_err(wm_error)? {
            ShowState::Normal => false,
            ShowState::Maximized => true,
            other => return Err(PlacementError::UnexpectedShowState(other)),
        };
        if was_maximized {
            debug!("restoring maximized window {}", window);
            self.wm.restore(window).map_err(wm_error)?;
        }

        // Restoring changes the rectangle, so read it only now.
        let rect = self.wm.window_rect(window).map_err(wm_error)?;
        let margins = self.margins(window, rect);
        let display = self.wm.display_for_window(window).map_err(wm_error)?;
        let grid = self.refresh_grid(&display);

        Ok(Placement {
            rect,
            was_maximized,
            margins,
            display: display.id,
            grid,
        })
    }

    /// Invisible frame margins of `window`, zero when they cannot be known.
    fn margins(&self, window: &WindowId, rect: Rect) -> Margins {
        match self.wm.extended_frame_bounds(window) {
            Ok(Some(frame)) => Margins::between(rect, frame),
            Ok(None) => Margins::ZERO,
            Err(e) => {
                warn!("frame bounds of {} unavailable ({}), using zero margins", window, e);
                Margins::ZERO
            }
        }
    }

    /// Grid of the display adjacent to `grid` in `dir`, if there is one.
    ///
    /// The neighbour is whichever display owns the point one pixel past the
    /// edge, level with the middle of the current display.  Resolving back to
    /// `origin` means there is no neighbour.
    fn adjacent_grid(&mut self, grid: &ScreenGrid, origin: &DisplayId, dir: Direction) -> Option<ScreenGrid> {
        let area = grid.area();
        let mid = area.center();
        let probe = match dir {
            Direction::Left => Point::new(area.left - 1, mid.y),
            Direction::Right => Point::new(area.right + 1, mid.y),
            Direction::Up => Point::new(mid.x, area.top - 1),
            Direction::Down => Point::new(mid.x, area.bottom + 1),
        };
        match self.wm.display_from_point(probe) {
            Ok(display) if display.id != *origin => {
                debug!("crossing {} from {} to {}", dir, origin, display.id);
                Some(self.refresh_grid(&display))
            }
            Ok(_) => {
                debug!("no display {} of {}", dir, origin);
                None
            }
            Err(e) => {
                warn!("probing {} of {} failed ({}), staying put", dir, origin, e);
                None
            }
        }
    }

    fn apply(&self, window: &WindowId, rect: Rect) -> Result<Rect, PlacementError> {
        debug!("  {} -> {:?}", window, rect);
        self.wm.set_window_rect(window, rect).map_err(wm_error)?;
        Ok(rect)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridLayout;
    use crate::geometry::nearest_display;
    use std::cell::RefCell;

    /// In-memory desktop with a single window.
    #[derive(Debug)]
    struct FakeWm {
        displays: RefCell<Vec<DisplayInfo>>,
        rect: RefCell<Rect>,
        state: RefCell<ShowState>,
        /// Rectangle the window returns to when restored.
        normal_rect: Rect,
        /// `reported - visible` per edge; `None` means no invisible frame.
        frame: Option<Margins>,
        frame_fails: bool,
        probe_fails: bool,
        focused: bool,
        applied: RefCell<Vec<Rect>>,
        restores: RefCell<u32>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("fake error: {0}")]
    struct FakeErr(&'static str);

    impl FakeWm {
        fn new(displays: Vec<DisplayInfo>, rect: Rect) -> Self {
            Self {
                displays: RefCell::new(displays),
                rect: RefCell::new(rect),
                state: RefCell::new(ShowState::Normal),
                normal_rect: rect,
                frame: None,
                frame_fails: false,
                probe_fails: false,
                focused: true,
                applied: RefCell::new(Vec::new()),
                restores: RefCell::new(0),
            }
        }

        fn maximized(displays: Vec<DisplayInfo>, normal_rect: Rect) -> Self {
            let area = displays[0].area;
            let wm = Self {
                normal_rect,
                ..Self::new(displays, area)
            };
            *wm.state.borrow_mut() = ShowState::Maximized;
            wm
        }

        fn last_applied(&self) -> Option<Rect> {
            self.applied.borrow().last().copied()
        }
    }

    impl WindowManager for FakeWm {
        type Error = FakeErr;

        fn active_window(&self) -> Result<Option<WindowId>, FakeErr> {
            Ok(self.focused.then(|| WindowId("0xbeef".into())))
        }

        fn window_rect(&self, _: &WindowId) -> Result<Rect, FakeErr> {
            Ok(*self.rect.borrow())
        }

        fn show_state(&self, _: &WindowId) -> Result<ShowState, FakeErr> {
            Ok(*self.state.borrow())
        }

        fn restore(&self, _: &WindowId) -> Result<(), FakeErr> {
            *self.restores.borrow_mut() += 1;
            *self.state.borrow_mut() = ShowState::Normal;
            *self.rect.borrow_mut() = self.normal_rect;
            Ok(())
        }

        fn set_window_rect(&self, _: &WindowId, rect: Rect) -> Result<(), FakeErr> {
            self.applied.borrow_mut().push(rect);
            *self.rect.borrow_mut() = rect;
            Ok(())
        }

        fn display_for_window(&self, _: &WindowId) -> Result<DisplayInfo, FakeErr> {
            let center = self.rect.borrow().center();
            nearest_display(&self.displays.borrow(), center)
                .cloned()
                .ok_or(FakeErr("no displays"))
        }

        fn display_from_point(&self, point: Point) -> Result<DisplayInfo, FakeErr> {
            if self.probe_fails {
                return Err(FakeErr("probe"));
            }
            nearest_display(&self.displays.borrow(), point)
                .cloned()
                .ok_or(FakeErr("no displays"))
        }

        fn extended_frame_bounds(&self, _: &WindowId) -> Result<Option<Rect>, FakeErr> {
            if self.frame_fails {
                return Err(FakeErr("invalid handle"));
            }
            let r = *self.rect.borrow();
            Ok(self.frame.map(|m| {
                Rect::new(r.left - m.left, r.top - m.top, r.right - m.right, r.bottom - m.bottom)
            }))
        }
    }

    fn display(name: &str, area: Rect) -> DisplayInfo {
        DisplayInfo {
            id: DisplayId::new(name),
            area,
        }
    }

    fn full_hd() -> Vec<DisplayInfo> {
        vec![display("DP-1", Rect::new(0, 0, 1920, 1080))]
    }

    /// DP-1 (1920×1080) with a taller, wider DP-2 to its right.
    fn side_by_side() -> Vec<DisplayInfo> {
        vec![
            display("DP-1", Rect::new(0, 0, 1920, 1080)),
            display("DP-2", Rect::new(1920, 0, 4480, 1440)),
        ]
    }

    /// DP-1 on top of DP-3.
    fn stacked() -> Vec<DisplayInfo> {
        vec![
            display("DP-1", Rect::new(0, 0, 1920, 1080)),
            display("DP-3", Rect::new(0, 1080, 1920, 2160)),
        ]
    }

    fn engine(wm: FakeWm) -> PlacementEngine<FakeWm> {
        PlacementEngine::new(wm, Config::default())
    }

    fn win() -> WindowId {
        WindowId("0xbeef".into())
    }

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    //  Move

    #[test]
    fn move_right_advances_one_cell() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 640, 360)));
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(640, 0, 1280, 360));
        assert_eq!(e.wm().last_applied(), Some(r));
    }

    #[test]
    fn move_right_at_last_cell_without_neighbour_stays() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(1280, 0, 1920, 360)));
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(1280, 0, 1920, 360));
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(1280, 0, 1920, 360), "repeat is a no-op");
    }

    #[test]
    fn move_right_then_left_round_trips() {
        let start = Rect::new(640, 360, 1280, 720);
        let mut e = engine(FakeWm::new(full_hd(), start));
        e.move_window(Direction::Right, &win()).unwrap();
        let r = e.move_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, start);
    }

    #[test]
    fn move_down_then_up_round_trips() {
        let start = Rect::new(0, 0, 640, 360);
        let mut e = engine(FakeWm::new(full_hd(), start));
        assert_eq!(
            e.move_window(Direction::Down, &win()).unwrap(),
            Rect::new(0, 360, 640, 720)
        );
        assert_eq!(e.move_window(Direction::Up, &win()).unwrap(), start);
    }

    #[test]
    fn repeated_move_left_stabilizes_at_first_cell() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(1500, 100, 1700, 300)));
        e.set_cols(&full_hd()[0], nz(6));
        let mut last = None;
        for _ in 0..10 {
            last = Some(e.move_window(Direction::Left, &win()).unwrap());
        }
        assert_eq!(last, Some(Rect::new(0, 100, 320, 300)));
        let again = e.move_window(Direction::Left, &win()).unwrap();
        assert_eq!(Some(again), last);
    }

    #[test]
    fn move_snaps_unaligned_window_into_grid() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(700, 50, 900, 250)));
        assert_eq!(
            e.move_window(Direction::Left, &win()).unwrap(),
            Rect::new(640, 50, 1280, 250)
        );
    }

    #[test]
    fn move_only_touches_its_axis() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 123, 640, 456)));
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!((r.top, r.bottom), (123, 456));
        let r = e.move_window(Direction::Down, &win()).unwrap();
        assert_eq!((r.left, r.right), (640, 1280));
        assert_eq!((r.top, r.bottom), (360, 720));
    }

    #[test]
    fn move_left_from_leftmost_display_edge_stays() {
        let mut e = engine(FakeWm::new(side_by_side(), Rect::new(0, 0, 640, 360)));
        let r = e.move_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 0, 640, 360));
    }

    #[test]
    fn move_right_crosses_to_adjacent_display() {
        let mut e = engine(FakeWm::new(side_by_side(), Rect::new(1280, 0, 1920, 360)));
        // DP-2 is 2560 wide: 853px cells with one odd column.
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(1920, 0, 2773, 360));
        assert_eq!(e.grids().len(), 2);
    }

    #[test]
    fn move_left_crosses_back_to_last_cell() {
        let mut e = engine(FakeWm::new(side_by_side(), Rect::new(1920, 0, 2773, 360)));
        let r = e.move_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(1280, 0, 1920, 360));
    }

    #[test]
    fn move_left_into_display_with_odd_column_skips_remainder() {
        let displays = vec![
            display("DP-2", Rect::new(-1366, 0, 0, 768)),
            display("DP-1", Rect::new(0, 0, 1920, 1080)),
        ];
        let mut e = engine(FakeWm::new(displays, Rect::new(0, 0, 640, 360)));
        let r = e.move_window(Direction::Left, &win()).unwrap();
        // Last full cell of a 1366px display starts at 910.
        assert_eq!(r, Rect::new(-456, 0, -1, 360));
    }

    #[test]
    fn move_down_and_up_cross_stacked_displays() {
        let mut e = engine(FakeWm::new(stacked(), Rect::new(0, 720, 640, 1080)));
        let r = e.move_window(Direction::Down, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 1080, 640, 1440));
        let r = e.move_window(Direction::Up, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 720, 640, 1080));
    }

    #[test]
    fn failed_probe_clamps_to_current_display() {
        let mut wm = FakeWm::new(side_by_side(), Rect::new(1280, 0, 1920, 360));
        wm.probe_fails = true;
        let mut e = engine(wm);
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(1280, 0, 1920, 360));
    }

    #[test]
    fn odd_column_near_right_edge() {
        let displays = vec![display("LVDS-1", Rect::new(0, 0, 1366, 768))];
        let mut e = engine(FakeWm::new(displays, Rect::new(455, 0, 910, 256)));
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(910, 0, 1365, 256));
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(910, 0, 1365, 256), "remainder pixel is not a cell");
        let r = e.move_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(455, 0, 910, 256));
    }

    //  Maximized windows

    #[test]
    fn maximized_move_left_restores_and_snaps_to_first_cell() {
        let mut e = engine(FakeWm::maximized(full_hd(), Rect::new(300, 200, 900, 600)));
        let r = e.move_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 200, 640, 600));
        assert_eq!(*e.wm().restores.borrow(), 1);
        assert_eq!(*e.wm().state.borrow(), ShowState::Normal);
    }

    #[test]
    fn maximized_move_right_snaps_to_last_cell() {
        let mut e = engine(FakeWm::maximized(full_hd(), Rect::new(300, 200, 900, 600)));
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(1280, 200, 1920, 600));
    }

    #[test]
    fn maximized_move_down_snaps_to_last_row() {
        let mut e = engine(FakeWm::maximized(full_hd(), Rect::new(300, 200, 900, 600)));
        let r = e.move_window(Direction::Down, &win()).unwrap();
        assert_eq!(r, Rect::new(300, 720, 900, 1080));
    }

    #[test]
    fn maximized_expand_right_reaches_far_edge() {
        let mut e = engine(FakeWm::maximized(full_hd(), Rect::new(300, 200, 900, 600)));
        let r = e.resize_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(300, 200, 1920, 600));
        assert_eq!(*e.wm().restores.borrow(), 1);
    }

    #[test]
    fn maximized_shrink_left_pulls_edge_to_last_cell() {
        let mut e = engine(FakeWm::maximized(full_hd(), Rect::new(100, 200, 1000, 600)));
        let r = e.resize_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(100, 200, 1280, 600));
    }

    #[test]
    fn other_show_states_are_refused() {
        let wm = FakeWm::new(full_hd(), Rect::new(0, 0, 640, 360));
        *wm.state.borrow_mut() = ShowState::Fullscreen;
        let mut e = engine(wm);
        let err = e.move_window(Direction::Right, &win()).unwrap_err();
        assert!(matches!(err, PlacementError::UnexpectedShowState(ShowState::Fullscreen)));
        let err = e.resize_window(Direction::Down, &win()).unwrap_err();
        assert!(matches!(err, PlacementError::UnexpectedShowState(_)));
        assert!(e.wm().applied.borrow().is_empty());
        assert_eq!(*e.wm().restores.borrow(), 0);
    }

    //  Margins

    /// Invisible 7px border on the left, right and bottom.
    fn bordered() -> Margins {
        Margins {
            left: -7,
            top: 0,
            right: 7,
            bottom: 7,
        }
    }

    #[test]
    fn margins_keep_visible_bounds_on_grid() {
        let mut wm = FakeWm::new(full_hd(), Rect::new(633, 0, 1287, 367));
        wm.frame = Some(bordered());
        let mut e = engine(wm);
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(1273, 0, 1927, 367));
        let r = e.move_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(633, 0, 1287, 367), "margins round-trip exactly");
    }

    #[test]
    fn margins_apply_to_vertical_moves() {
        let mut wm = FakeWm::new(full_hd(), Rect::new(633, 0, 1287, 367));
        wm.frame = Some(bordered());
        let mut e = engine(wm);
        let r = e.move_window(Direction::Down, &win()).unwrap();
        assert_eq!(r, Rect::new(633, 360, 1287, 727));
    }

    #[test]
    fn margins_apply_to_resize() {
        let mut wm = FakeWm::new(full_hd(), Rect::new(-7, 0, 647, 367));
        wm.frame = Some(bordered());
        let mut e = engine(wm);
        let r = e.resize_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(-7, 0, 1287, 367));
        let r = e.resize_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(-7, 0, 647, 367));
    }

    #[test]
    fn frame_bounds_failure_uses_zero_margins() {
        let mut wm = FakeWm::new(full_hd(), Rect::new(0, 0, 640, 360));
        wm.frame_fails = true;
        let mut e = engine(wm);
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(640, 0, 1280, 360));
    }

    //  Resize

    #[test]
    fn expand_right_snaps_to_next_boundary() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 640, 360)));
        let r = e.resize_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 0, 1280, 360));
    }

    #[test]
    fn expand_down_snaps_to_next_boundary() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 640, 360)));
        let r = e.resize_window(Direction::Down, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 0, 640, 720));
    }

    #[test]
    fn expand_right_clamps_to_screen_edge() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 2000, 360)));
        let r = e.resize_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 0, 1920, 360));
    }

    #[test]
    fn expand_right_with_odd_column_stops_before_remainder() {
        let displays = vec![display("LVDS-1", Rect::new(0, 0, 1366, 768))];
        let mut e = engine(FakeWm::new(displays, Rect::new(0, 0, 910, 256)));
        let r = e.resize_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 0, 1365, 256));
        let r = e.resize_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 0, 1365, 256));
    }

    #[test]
    fn expand_off_screen_window_is_noop() {
        let displays = vec![display("LVDS-1", Rect::new(0, 0, 1366, 768))];
        let start = Rect::new(1365, 0, 1500, 256);
        let mut e = engine(FakeWm::new(displays, start));
        let r = e.resize_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, start);
    }

    #[test]
    fn expand_never_crosses_displays() {
        let mut e = engine(FakeWm::new(side_by_side(), Rect::new(640, 0, 1920, 360)));
        let r = e.resize_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(640, 0, 1920, 360));
        assert_eq!(e.grids().len(), 1, "adjacent display never consulted");
    }

    #[test]
    fn shrink_left_pulls_right_edge_in() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 1280, 360)));
        let r = e.resize_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 0, 640, 360));
    }

    #[test]
    fn shrink_left_stops_at_one_cell() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(640, 0, 1280, 360)));
        let r = e.resize_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(640, 0, 1280, 360));
    }

    #[test]
    fn shrink_up_pulls_bottom_edge_in() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 640, 1080)));
        let r = e.resize_window(Direction::Up, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 0, 640, 720));
    }

    #[test]
    fn resize_keeps_positive_size() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 1920, 1080)));
        for _ in 0..5 {
            let r = e.resize_window(Direction::Left, &win()).unwrap();
            assert!(r.width() > 0);
            let r = e.resize_window(Direction::Up, &win()).unwrap();
            assert!(r.height() > 0);
        }
        assert_eq!(e.wm().last_applied(), Some(Rect::new(0, 0, 640, 360)));
    }

    /// 1920px wide with seven 274px columns and two leftover pixels.
    fn seven_cols(e: &mut PlacementEngine<FakeWm>) {
        let g = e.set_cols(&full_hd()[0], nz(7));
        assert_eq!((g.cell_width(), g.odd_col()), (274, 2));
    }

    #[test]
    fn shrink_left_with_leftover_pixels_never_inverts() {
        let start = Rect::new(275, 0, 550, 360);
        let mut e = engine(FakeWm::new(full_hd(), start));
        seven_cols(&mut e);
        let r = e.resize_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, start);
        assert!(r.width() > 0);
    }

    #[test]
    fn shrink_left_one_pixel_over_a_cell_with_odd_column() {
        let displays = vec![display("LVDS-1", Rect::new(0, 0, 1366, 768))];
        let start = Rect::new(455, 0, 911, 256);
        let mut e = engine(FakeWm::new(displays, start));
        let r = e.resize_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, start);
        assert!(r.width() > 0);
    }

    #[test]
    fn shrink_left_with_leftover_pixels_still_snaps() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 600, 360)));
        seven_cols(&mut e);
        let r = e.resize_window(Direction::Left, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 0, 548, 360));
    }

    #[test]
    fn shrink_up_with_leftover_pixels_never_inverts() {
        // Seven 154px rows with two leftover pixels.
        let start = Rect::new(0, 155, 640, 310);
        let mut e = engine(FakeWm::new(full_hd(), start));
        let g = e.set_rows(&full_hd()[0], nz(7));
        assert_eq!((g.cell_height(), g.odd_row()), (154, 2));
        let r = e.resize_window(Direction::Up, &win()).unwrap();
        assert_eq!(r, start);
        assert!(r.height() > 0);
    }

    #[test]
    fn shrink_up_stops_at_one_cell() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 360, 640, 720)));
        let r = e.resize_window(Direction::Up, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 360, 640, 720));
    }

    #[test]
    fn expand_down_off_screen_window_is_noop() {
        // Three 256px rows with one leftover pixel.
        let displays = vec![display("LVDS-1", Rect::new(0, 0, 1366, 769))];
        let start = Rect::new(0, 768, 455, 900);
        let mut e = engine(FakeWm::new(displays, start));
        let r = e.resize_window(Direction::Down, &win()).unwrap();
        assert_eq!(r, start);
    }

    #[test]
    fn repeated_shrink_on_uneven_grid_keeps_positive_size() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(1, 1, 1919, 1079)));
        seven_cols(&mut e);
        e.set_rows(&full_hd()[0], nz(7));
        for _ in 0..10 {
            let r = e.resize_window(Direction::Left, &win()).unwrap();
            assert!(r.width() > 0, "{:?}", r);
            let r = e.resize_window(Direction::Up, &win()).unwrap();
            assert!(r.height() > 0, "{:?}", r);
        }
    }

    //  Command handling and configuration

    #[test]
    fn handle_dispatches_to_active_window() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 640, 360)));
        e.handle(Command::Move(Direction::Right)).unwrap();
        e.handle(Command::Resize(Direction::Down)).unwrap();
        assert_eq!(e.wm().last_applied(), Some(Rect::new(640, 0, 1280, 720)));
    }

    #[test]
    fn handle_without_focus_is_noop() {
        let mut wm = FakeWm::new(full_hd(), Rect::new(0, 0, 640, 360));
        wm.focused = false;
        let mut e = engine(wm);
        e.handle(Command::Move(Direction::Right)).unwrap();
        assert!(e.wm().applied.borrow().is_empty());
        assert!(e.grids().is_empty());
    }

    #[test]
    fn configured_layout_shapes_new_grids() {
        let mut config = Config::default();
        config.displays.insert(
            "DP-1".into(),
            GridLayout {
                rows: Some(nz(2)),
                cols: Some(nz(4)),
            },
        );
        let mut e = PlacementEngine::new(FakeWm::new(full_hd(), Rect::new(0, 0, 480, 540)), config);
        let r = e.move_window(Direction::Right, &win()).unwrap();
        assert_eq!(r, Rect::new(480, 0, 960, 540));
        let r = e.move_window(Direction::Down, &win()).unwrap();
        assert_eq!(r, Rect::new(480, 540, 960, 1080));
    }

    #[test]
    fn set_rows_changes_cell_height() {
        let mut e = engine(FakeWm::new(full_hd(), Rect::new(0, 0, 640, 540)));
        let g = e.set_rows(&full_hd()[0], nz(2));
        assert_eq!(g.cell_height(), 540);
        let r = e.move_window(Direction::Down, &win()).unwrap();
        assert_eq!(r, Rect::new(0, 540, 640, 1080));
    }

    #[test]
    fn set_cols_on_new_display_keeps_configured_rows() {
        let mut config = Config::default();
        config.default.rows = Some(nz(2));
        let mut e = PlacementEngine::new(FakeWm::new(full_hd(), Rect::new(0, 0, 480, 540)), config);
        let g = e.set_cols(&full_hd()[0], nz(4));
        assert_eq!((g.cols(), g.rows()), (4, 2));
        assert_eq!(e.grids().get(&DisplayId::new("DP-1")).copied(), Some(g));
    }

    #[test]
    fn area_change_reapplies_configured_layout() {
        let mut config = Config::default();
        config.default.cols = Some(nz(4));
        let mut e = PlacementEngine::new(FakeWm::new(full_hd(), Rect::new(0, 0, 480, 360)), config);
        e.set_cols(&full_hd()[0], nz(2));
        assert_eq!(e.grids().get(&DisplayId::new("DP-1")).map(|g| g.cols()), Some(2));

        // A bar appears at the top of the display.
        e.wm().displays.borrow_mut()[0].area = Rect::new(0, 40, 1920, 1080);
        e.move_window(Direction::Right, &win()).unwrap();
        let g = *e.grids().get(&DisplayId::new("DP-1")).unwrap();
        assert_eq!((g.cols(), g.rows()), (4, 3));
        assert_eq!(g.area(), Rect::new(0, 40, 1920, 1080));
        assert_eq!(e.wm().last_applied(), Some(Rect::new(480, 0, 960, 360)));
    }
}
