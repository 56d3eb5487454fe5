//! Application configuration.
//!
//! The configuration is loaded from a JSON file
//! (`$XDG_CONFIG_HOME/gridsnap/config.json`).  It chooses how many rows and
//! columns each display's grid has.  Displays are matched by the name the
//! window manager reports (e.g. `"DP-1"`); any display without an entry uses
//! the `"default"` layout.
//!
//! # Example
//!
//! ```json
//! {
//!   "default": { "rows": 2, "cols": 3 },
//!   "displays": {
//!     "DP-1": { "rows": 2, "cols": 4 },
//!     "eDP-1": { "cols": 2 }
//!   }
//! }
//! ```
//!
//! Counts are positive integers; `0` is rejected while parsing so an invalid
//! layout never reaches a grid.

use crate::command::DisplayId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::Path;

/// Top-level configuration.
///
/// Every field is optional — a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Layout applied to displays without their own entry.
    #[serde(default)]
    pub default: GridLayout,

    /// Per-display layouts, keyed by display name.
    #[serde(default)]
    pub displays: HashMap<String, GridLayout>,
}

/// Rows and columns of one grid.
///
/// A missing field keeps the grid's own default of 3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    pub rows: Option<NonZeroU32>,
    pub cols: Option<NonZeroU32>,
}

impl GridLayout {
    /// Whether the layout changes anything.
    pub fn is_empty(&self) -> bool {
        self.rows.is_none() && self.cols.is_none()
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// The layout to apply to `display`.
    ///
    /// Fields missing from a display's entry fall back to the default layout.
    pub fn layout_for(&self, display: &DisplayId) -> GridLayout {
        match self.displays.get(display.as_str()) {
            Some(own) => GridLayout {
                rows: own.rows.or(self.default.rows),
                cols: own.cols.or(self.default.cols),
            },
            None => self.default,
        }
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
