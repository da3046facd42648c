//! Entry point for the **swaystrip** daemon.
//!
//! Opens the two IPC connections, spawns the event listener thread and
//! processes [`BarEvent`]s on the main thread.  This binary renders
//! through [`LogSurface`], which just logs every widget operation — a
//! real bar embeds [`WorkspaceBar`] with a toolkit-backed
//! [`ButtonSurface`] instead.

use log::{error, info};
use std::sync::{mpsc, Arc};
use swaystrip::bar::WorkspaceBar;
use swaystrip::config::Config;
use swaystrip::event::BarEvent;
use swaystrip::state::{OutputName, WorkspaceStore};
use swaystrip::sway::client::CommandClient;
use swaystrip::sway::listener::EventListener;
use swaystrip::traits::ButtonSurface;

/// Resolve the config directory (`$XDG_CONFIG_HOME/swaystrip`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("swaystrip")
}

/// Try to load the config from `$XDG_CONFIG_HOME/swaystrip/config.json`,
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

//  Logging surface

/// A [`ButtonSurface`] that renders to the log.
///
/// Handles are the workspace numbers themselves.  Useful for watching
/// the reconciler work against a live compositor without any toolkit.
#[derive(Debug, Default)]
struct LogSurface;

impl ButtonSurface for LogSurface {
    type Handle = i32;

    fn create_button(&mut self, num: i32, label: &str) -> i32 {
        info!("+ button {} [{}]", num, label);
        num
    }

    fn set_class(&mut self, handle: &i32, class: &str, on: bool) {
        info!("  button {}: {}{}", handle, if on { "+" } else { "-" }, class);
    }

    fn reorder(&mut self, handle: &i32, position: i32) {
        info!("  button {} -> position {}", handle, position);
    }

    fn show(&mut self, _handle: &i32) {}

    fn remove(&mut self, handle: i32) {
        info!("- button {}", handle);
    }
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    let output_name = match config.output.clone() {
        Some(name) => name,
        None => {
            error!("no \"output\" configured; the strip cannot filter workspaces");
            std::process::exit(1);
        }
    };

    let socket = match swaystrip::sway::socket_path() {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // Both connections are opened once and held until process exit.
    let client = match CommandClient::connect(&socket) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("command connection to {} failed: {}", socket.display(), e);
            std::process::exit(1);
        }
    };
    let listener = match EventListener::connect(&socket) {
        Ok(listener) => listener,
        Err(e) => {
            error!("event connection to {} failed: {}", socket.display(), e);
            std::process::exit(1);
        }
    };

    let store = WorkspaceStore::new();
    let output = OutputName::new();
    let (tx, rx) = mpsc::channel::<BarEvent>();

    let _listener = match listener.spawn(client.clone(), store.clone(), output.clone(), tx) {
        Ok(handle) => handle,
        Err(e) => {
            error!("failed to start the event listener: {}", e);
            std::process::exit(1);
        }
    };

    // Published after the listener is up: its poll path performs the
    // initial fetch and render, the same way a surface resolving its
    // display at runtime would kick things off.
    output.set(output_name.clone());

    let mut bar = WorkspaceBar::new(client, store, output, &config, LogSurface);
    info!("swaystrip running on {}", output_name);
    for event in rx {
        bar.handle(event);
    }
    info!("event listener closed, exiting");
}
