//! The event half of the IPC pair.
//!
//! [`EventListener`] owns a second connection, subscribed to workspace
//! change notifications at construction.  [`spawn`](EventListener::spawn)
//! moves it onto a background thread that blocks for one notification at
//! a time, re-fetches the full workspace list through the shared
//! [`WindowManager`] (on the *other* connection), stores the snapshot and
//! pushes one [`BarEvent::Refresh`] into the consumer channel.
//!
//! The thread never touches rendered state itself — it hands off data
//! and nothing else.  A single bad event (malformed frame, parse
//! failure, transient disconnect) is logged and skipped; the loop only
//! ends when the consumer goes away or [`ListenerHandle::stop`] is
//! called.

use crate::event::BarEvent;
use crate::state::{OutputName, WorkspaceStore};
use crate::sway::ipc::{Connection, IpcError, MessageType, ShutdownHandle};
use crate::traits::WindowManager;
use log::{error, info};
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// How long to wait between checks while the output name is unknown.
const OUTPUT_POLL: Duration = Duration::from_millis(150);

/// Pause after a failed iteration, so a permanently dead socket cannot
/// spin the thread hot.
const ERROR_PAUSE: Duration = Duration::from_millis(150);

/// Errors from constructing the listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("ipc error: {0}")]
    Ipc(#[from] IpcError),
    #[error("malformed subscribe reply: {0}")]
    Json(#[from] serde_json::Error),
    #[error("compositor refused the workspace subscription")]
    SubscribeRefused,
}

#[derive(Debug, Deserialize)]
struct SubscribeAck {
    success: bool,
}

/// A connection subscribed to workspace change notifications, ready to be
/// moved onto its thread.
pub struct EventListener {
    conn: Connection,
}

impl EventListener {
    /// Open the event connection and subscribe to workspace changes.
    /// Fatal on failure — the strip cannot exist without it.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self, ListenerError> {
        let mut conn = Connection::open(path)?;
        let reply = conn.send_and_receive(MessageType::Subscribe, br#"["workspace"]"#)?;
        let ack: SubscribeAck = serde_json::from_slice(&reply)?;
        if !ack.success {
            return Err(ListenerError::SubscribeRefused);
        }
        Ok(Self::from_connection(conn))
    }

    pub(crate) fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Start the listener thread.
    ///
    /// `wm` must be backed by a different connection than this listener's
    /// — fetching through the event connection would race the
    /// notification stream.
    pub fn spawn<W>(
        self,
        wm: Arc<W>,
        store: Arc<WorkspaceStore>,
        output: OutputName,
        sink: mpsc::Sender<BarEvent>,
    ) -> Result<ListenerHandle, IpcError>
    where
        W: WindowManager + Send + Sync + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let shutdown = self.conn.shutdown_handle()?;
        let thread = {
            let stop = stop.clone();
            thread::spawn(move || run_loop(self.conn, wm, store, output, sink, stop))
        };
        Ok(ListenerHandle {
            stop,
            shutdown,
            thread,
        })
    }
}

fn run_loop<W: WindowManager>(
    mut conn: Connection,
    wm: Arc<W>,
    store: Arc<WorkspaceStore>,
    output: OutputName,
    sink: mpsc::Sender<BarEvent>,
    stop: Arc<AtomicBool>,
) {
    while !stop.load(Ordering::Relaxed) {
        if output.get().is_none() {
            // The surface has not resolved its output yet.  Consuming a
            // notification now would eat a change the strip cannot render,
            // so poll instead; once the name lands, fall through and do
            // the initial fetch without waiting for an event.
            thread::sleep(OUTPUT_POLL);
            if output.get().is_none() {
                continue;
            }
        } else {
            match conn.receive() {
                // Any workspace notification triggers a full re-fetch;
                // the payload itself is not inspected.
                Ok(_) => {}
                Err(e) => {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    error!("event connection: {}", e);
                    thread::sleep(ERROR_PAUSE);
                    continue;
                }
            }
        }

        // Fetch and replace under the store lock, so the swap cannot race
        // a reconciliation pass on the consumer thread.
        let mut guard = store.lock();
        match wm.workspaces() {
            Ok(snapshot) => {
                guard.replace_snapshot(snapshot);
                drop(guard);
                if sink.send(BarEvent::Refresh).is_err() {
                    info!("consumer gone, event listener exiting");
                    return;
                }
            }
            Err(e) => {
                drop(guard);
                error!("workspace fetch failed: {}", e);
                thread::sleep(ERROR_PAUSE);
            }
        }
    }
    info!("event listener stopped");
}

/// Handle to a running listener thread.
///
/// The source this crate reproduces had no shutdown path at all — the
/// listener lived until process exit.  The explicit stop signal is a
/// deliberate extension for embedders and tests.
pub struct ListenerHandle {
    stop: Arc<AtomicBool>,
    shutdown: ShutdownHandle,
    thread: thread::JoinHandle<()>,
}

impl ListenerHandle {
    /// Stop the listener and wait for its thread to finish.
    ///
    /// Shuts the event socket down so a blocked read returns immediately.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Relaxed);
        self.shutdown.shutdown();
        let _ = self.thread.join();
    }
}

//  Tests
