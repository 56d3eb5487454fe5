//! IPC listener that accepts commands over a Unix socket.
//!
//! Key-bind helpers and scripts connect to the socket and send
//! newline-delimited JSON commands, e.g. from a Hyprland bind:
//!
//! ```text
//! bind = SUPER, left, exec, echo '{"Move":"Left"}' | socat - UNIX-CONNECT:$XDG_RUNTIME_DIR/gridsnap.sock
//! ```

pub mod listener;
