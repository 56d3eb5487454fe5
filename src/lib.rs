//! **gridsnap** — move and resize windows on a per-monitor grid.
//!
//! Every display's usable area is divided into a `cols × rows` grid (3×3 by
//! default).  A command such as *move left* or *resize down* snaps the
//! focused window to the neighbouring grid cell; moving past the last cell
//! carries the window onto the adjacent display, whose grid may have a
//! different cell size.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowManager`] — abstracts window geometry, show-state and
//!   display lookup so the placement logic is not coupled to any specific
//!   compositor.
//! * [`traits::CommandSource`] — abstracts the transport that delivers
//!   user-intent so the main loop is not coupled to any specific IPC
//!   mechanism.
//!
//! [`grid::ScreenGrid`] holds the per-display cell arithmetic and
//! [`engine::PlacementEngine`] applies it.  Concrete implementations live in
//! [`hyprland`] (Hyprland IPC) and [`ipc`] (Unix-socket command listener).

pub mod command;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod grid;
pub mod hyprland;
pub mod ipc;
pub mod traits;
