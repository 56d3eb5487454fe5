//! Core traits that decouple gridsnap from any specific window manager or
//! transport mechanism.
//!
//! Every concrete backend (Hyprland, a Unix-socket listener, a test harness,
//! …) implements one of these traits.  The
//! [`PlacementEngine`](crate::engine::PlacementEngine) only depends on these
//! abstractions.

use crate::command::{Command, DisplayInfo, ShowState, WindowId};
use crate::geometry::{Point, Rect};
use std::sync::mpsc;

/// Window, display and frame queries the placement engine needs.
///
/// All calls are synchronous and are expected to be fast.  An implementation
/// might talk to a compositor over IPC, or it might be an in-memory fake used
/// in tests.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Return the currently focused window, or `None` if nothing is focused.
    fn active_window(&self) -> Result<Option<WindowId>, Self::Error>;

    /// Current rectangle of `window` in virtual-desktop coordinates, as the
    /// platform reports it (invisible frame included).
    fn window_rect(&self, window: &WindowId) -> Result<Rect, Self::Error>;

    /// Current show-state of `window`.
    fn show_state(&self, window: &WindowId) -> Result<ShowState, Self::Error>;

    /// Return a maximized `window` to its normal, restorable state.
    fn restore(&self, window: &WindowId) -> Result<(), Self::Error>;

    /// Move and resize `window` in one call.  `rect` uses the same
    /// convention as [`window_rect`](Self::window_rect).
    fn set_window_rect(&self, window: &WindowId, rect: Rect) -> Result<(), Self::Error>;

    /// The display currently hosting `window`.
    fn display_for_window(&self, window: &WindowId) -> Result<DisplayInfo, Self::Error>;

    /// The display owning `point`, or the nearest display if no display
    /// contains it.
    ///
    /// The engine relies on the nearest-display fallback: probing just past
    /// the outermost edge of the desktop must resolve back to the outermost
    /// display.
    fn display_from_point(&self, point: Point) -> Result<DisplayInfo, Self::Error>;

    /// The visible bounds of `window`, without any invisible resize border.
    ///
    /// Returns `Ok(None)` on platforms that draw no such border or cannot
    /// report it; the engine then uses zero margins.
    fn extended_frame_bounds(&self, window: &WindowId) -> Result<Option<Rect>, Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport — a Unix socket, a hotkey
/// daemon, an in-memory channel, … — and forward parsed commands into the
/// provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
///   The receiving side processes commands one at a time, which is what
///   serializes concurrent sources.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
