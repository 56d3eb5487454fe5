//! Entry point for the **gridsnap** daemon.
//!
//! Spawns the command listener on a background thread and processes
//! incoming commands one at a time on the main thread.

use gridsnap::command::Command;
use gridsnap::config::Config;
use gridsnap::engine::PlacementEngine;
use gridsnap::hyprland::wm::HyprlandWm;
use gridsnap::ipc::listener::UnixSocketListener;
use gridsnap::traits::CommandSource;
use log::{error, info};
use std::sync::mpsc;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/gridsnap.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/gridsnap`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("gridsnap")
}

/// Try to load the config from `$XDG_CONFIG_HOME/gridsnap/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();

    let config = load_config();
    let mut engine = PlacementEngine::new(HyprlandWm::new(), config);

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    info!("gridsnap running");
    // One command at a time: each finishes, including its final window
    // update, before the next is read.
    for cmd in cmd_rx {
        if let Err(e) = engine.handle(cmd) {
            error!("{} failed: {}", cmd, e);
        }
    }
    info!("all command sources closed, exiting");
}

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}
