//! Commands and types used throughout gridsnap.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes the eight placement actions, and [`Direction`],
//! [`WindowId`], [`DisplayId`], [`DisplayInfo`] and [`ShowState`] provide
//! the supporting data types.
//!
//! Direction strings on the wire are case-insensitive (`"left"`, `"Left"`,
//! `"LEFT"`).

use crate::geometry::{Axis, Rect};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Direction of a move or resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    /// The axis this direction travels along.
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    /// `true` for directions that increase the coordinate (right, down).
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Up => write!(f, "up"),
            Direction::Right => write!(f, "right"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Parse a direction string (case-insensitive, surrounding whitespace ignored).
pub fn parse_direction(s: &str) -> Option<Direction> {
    match s.trim().to_lowercase().as_str() {
        "left" => Some(Direction::Left),
        "up" => Some(Direction::Up),
        "right" => Some(Direction::Right),
        "down" => Some(Direction::Down),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_direction(&s).ok_or_else(|| DeError::custom(format!("invalid direction: {:?}", s)))
    }
}

/// Every action the placement engine can perform.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the
/// [`PlacementEngine`](crate::engine::PlacementEngine).
///
/// On the wire a command is a single JSON object: `{"Move":"Left"}`,
/// `{"Resize":"down"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Move the focused window one grid cell in the given direction,
    /// crossing to the adjacent display at the edge of the current one.
    Move(Direction),

    /// Move one edge of the focused window by one grid cell.
    ///
    /// `Left`/`Up` shrink the window by pulling its right/bottom edge in;
    /// `Right`/`Down` expand it by pushing that edge out.  Resizes never
    /// leave the window's current display.
    Resize(Direction),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(dir) => write!(f, "move {}", dir),
            Command::Resize(dir) => write!(f, "resize {}", dir),
        }
    }
}

/// Opaque handle of a top-level window, as understood by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowId(pub String);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable identity of a physical display (e.g. `"DP-1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(String);

impl DisplayId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A display together with its usable (bar/taskbar-free) area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInfo {
    pub id: DisplayId,
    /// Usable area in virtual-desktop coordinates.
    pub area: Rect,
}

/// How a window is currently shown.
///
/// Only [`Normal`](ShowState::Normal) and [`Maximized`](ShowState::Maximized)
/// windows can be placed; the other states are reported so the engine can
/// refuse them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowState {
    Normal,
    Maximized,
    Fullscreen,
    Minimized,
}

impl fmt::Display for ShowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowState::Normal => write!(f, "normal"),
            ShowState::Maximized => write!(f, "maximized"),
            ShowState::Fullscreen => write!(f, "fullscreen"),
            ShowState::Minimized => write!(f, "minimized"),
        }
    }
}
