//! [`WindowManager`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! avoiding any shell command invocation or third-party crate for socket
//! discovery.
//!
//! Windows are addressed by their client address (`0x…`), displays by
//! monitor name.  Hyprland only lets floating windows take arbitrary
//! geometry, so a tiled window is floated before it is placed.

use crate::command::{DisplayId, DisplayInfo, ShowState, WindowId};
use crate::geometry::{nearest_display, Point, Rect};
use crate::traits::WindowManager;
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed window manager.
///
/// All communication happens over Hyprland's IPC socket
/// (`$XDG_RUNTIME_DIR/hypr/<instance>/.socket.sock`).  No child processes
/// are spawned.
pub struct HyprlandWm;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandWmError(String);

impl Default for HyprlandWm {
    fn default() -> Self {
        Self
    }
}

impl HyprlandWm {
    /// Create a new handle.
    ///
    /// No connection is opened eagerly; each method call opens a short-lived
    /// IPC request.
    pub fn new() -> Self {
        Self
    }
}

//  Direct Hyprland IPC helpers

/// Resolve the Hyprland command socket path.
fn socket_path() -> Result<PathBuf, HyprlandWmError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandWmError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandWmError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(format!(
        "{}/hypr/{}/.socket.sock",
        runtime_dir, his
    )))
}

/// Send a raw command to the Hyprland command socket and return the
/// response as a string.
fn ipc_request(command: &str) -> Result<String, HyprlandWmError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandWmError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandWmError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandWmError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandWmError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and parse the response.
fn ipc_json<T: for<'de> Deserialize<'de>>(data_command: &str) -> Result<T, HyprlandWmError> {
    let json = ipc_request(&format!("j/{}", data_command))?;
    serde_json::from_str(&json).map_err(|e| HyprlandWmError(format!("parse {}: {}", data_command, e)))
}

/// Send a dispatch command and check for `"ok"`.
fn ipc_dispatch(args: &str) -> Result<(), HyprlandWmError> {
    debug!("dispatch {}", args);
    let response = ipc_request(&format!("/dispatch {}", args))?;
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandWmError(format!("dispatch error: {}", response)))
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Debug, Deserialize)]
struct MonitorJson {
    id: i64,
    name: String,
    width: i32,
    height: i32,
    x: i32,
    y: i32,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    transform: u8,
    /// Space taken by bars: `[left, top, right, bottom]`.
    #[serde(default)]
    reserved: [i32; 4],
}

fn unit_scale() -> f64 {
    1.0
}

impl MonitorJson {
    /// Usable area in layout (logical) coordinates.
    fn usable_area(&self) -> Rect {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let mut w = (f64::from(self.width) / scale).round() as i32;
        let mut h = (f64::from(self.height) / scale).round() as i32;
        // Odd transforms rotate the output by 90° or 270°.
        if self.transform % 2 == 1 {
            std::mem::swap(&mut w, &mut h);
        }
        let [rl, rt, rr, rb] = self.reserved;
        Rect::new(self.x + rl, self.y + rt, self.x + w - rr, self.y + h - rb)
    }

    fn to_display(&self) -> DisplayInfo {
        DisplayInfo {
            id: DisplayId::new(self.name.clone()),
            area: self.usable_area(),
        }
    }
}

/// Fullscreen state: a mode number on current Hyprland, a flag on older
/// releases.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum FullscreenJson {
    Mode(i64),
    Flag(bool),
}

impl Default for FullscreenJson {
    fn default() -> Self {
        FullscreenJson::Mode(0)
    }
}

/// Subset of a client object from `j/clients` / `j/activewindow`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientJson {
    address: String,
    at: [i32; 2],
    size: [i32; 2],
    monitor: i64,
    #[serde(default)]
    floating: bool,
    #[serde(default)]
    fullscreen: FullscreenJson,
    /// Only on older releases: `0` fullscreen, `1` maximized.
    #[serde(default)]
    fullscreen_mode: Option<i64>,
}

impl ClientJson {
    fn rect(&self) -> Rect {
        Rect::from_origin_size(self.at[0], self.at[1], self.size[0], self.size[1])
    }

    fn show_state(&self) -> ShowState {
        match self.fullscreen {
            FullscreenJson::Mode(0) | FullscreenJson::Flag(false) => ShowState::Normal,
            FullscreenJson::Mode(1) => ShowState::Maximized,
            FullscreenJson::Flag(true) if self.fullscreen_mode == Some(1) => ShowState::Maximized,
            _ => ShowState::Fullscreen,
        }
    }
}

fn monitors() -> Result<Vec<MonitorJson>, HyprlandWmError> {
    ipc_json("monitors")
}

fn client(window: &WindowId) -> Result<ClientJson, HyprlandWmError> {
    let clients: Vec<ClientJson> = ipc_json("clients")?;
    clients
        .into_iter()
        .find(|c| c.address == window.0)
        .ok_or_else(|| HyprlandWmError(format!("unknown window: {}", window)))
}

//  WindowManager implementation

impl WindowManager for HyprlandWm {
    type Error = HyprlandWmError;

    fn active_window(&self) -> Result<Option<WindowId>, Self::Error> {
        let json = ipc_request("j/activewindow")?;
        // Hyprland returns an empty object `{}` when no window is focused.
        if json.trim() == "{}" {
            return Ok(None);
        }
        let c: ClientJson =
            serde_json::from_str(&json).map_err(|e| HyprlandWmError(format!("parse: {}", e)))?;
        Ok(Some(WindowId(c.address)))
    }

    fn window_rect(&self, window: &WindowId) -> Result<Rect, Self::Error> {
        Ok(client(window)?.rect())
    }

    fn show_state(&self, window: &WindowId) -> Result<ShowState, Self::Error> {
        Ok(client(window)?.show_state())
    }

    fn restore(&self, window: &WindowId) -> Result<(), Self::Error> {
        // `fullscreen 1` toggles maximize on the focused window.
        ipc_dispatch(&format!("focuswindow address:{}", window))?;
        ipc_dispatch("fullscreen 1")
    }

    fn set_window_rect(&self, window: &WindowId, rect: Rect) -> Result<(), Self::Error> {
        if !client(window)?.floating {
            ipc_dispatch(&format!("setfloating address:{}", window))?;
        }
        ipc_dispatch(&format!(
            "resizewindowpixel exact {} {},address:{}",
            rect.width(),
            rect.height(),
            window
        ))?;
        ipc_dispatch(&format!(
            "movewindowpixel exact {} {},address:{}",
            rect.left, rect.top, window
        ))
    }

    fn display_for_window(&self, window: &WindowId) -> Result<DisplayInfo, Self::Error> {
        let c = client(window)?;
        monitors()?
            .iter()
            .find(|m| m.id == c.monitor)
            .map(MonitorJson::to_display)
            .ok_or_else(|| HyprlandWmError(format!("unknown monitor id: {}", c.monitor)))
    }

    fn display_from_point(&self, point: Point) -> Result<DisplayInfo, Self::Error> {
        let displays: Vec<DisplayInfo> = monitors()?.iter().map(MonitorJson::to_display).collect();
        nearest_display(&displays, point)
            .cloned()
            .ok_or_else(|| HyprlandWmError("no monitors".into()))
    }

    fn extended_frame_bounds(&self, _window: &WindowId) -> Result<Option<Rect>, Self::Error> {
        // Hyprland reports the drawn geometry; there is no invisible frame.
        Ok(None)
    }
}
