//! Shared workspace state.
//!
//! [`WorkspaceStore`] is the single source of truth: the latest snapshot
//! fetched from the compositor plus the scroll-in-flight flag, behind one
//! coarse mutex.  The event listener thread replaces the snapshot under
//! the lock; the consumer thread holds the same lock for a whole
//! reconciliation pass, so a replace can never race an in-progress diff.
//!
//! Operations happen at human-interaction rate, so one mutex is plenty.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// One workspace as reported by a `GET_WORKSPACES` reply.
///
/// Deserialized straight from the compositor's JSON; unknown fields
/// (`rect`, `layout`, …) are ignored.  Records are immutable once parsed —
/// a new snapshot replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Compositor-assigned workspace number, unique within a snapshot.
    pub num: i32,
    pub name: String,
    /// Name of the output the workspace is on (e.g. `"eDP-1"`).
    pub output: String,
    pub focused: bool,
    pub visible: bool,
    pub urgent: bool,
}

/// Snapshot + scroll flag, guarded by [`WorkspaceStore`]'s mutex.
#[derive(Debug, Default)]
struct StoreInner {
    /// Latest snapshot, in the order the compositor reported it.  The
    /// scroll navigator walks this order linearly — it is *not* sorted
    /// by `num`.
    snapshot: Vec<Workspace>,
    /// True while a scroll-triggered switch is in flight.  Set by
    /// [`StoreGuard::try_begin_scroll`], cleared by the next
    /// reconciliation pass.
    scrolling: bool,
}

/// The single source of truth shared between the listener thread and the
/// consumer loop.
#[derive(Debug, Default)]
pub struct WorkspaceStore {
    inner: Mutex<StoreInner>,
}

impl WorkspaceStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Acquire the store lock.
    ///
    /// The guard is held across compound operations — fetch-and-replace in
    /// the listener, an entire diff pass in the reconciler — so nothing
    /// can interleave between reading the snapshot and acting on it.
    pub fn lock(&self) -> StoreGuard<'_> {
        StoreGuard(self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Consistent read of the current snapshot.
    pub fn current_snapshot(&self) -> Vec<Workspace> {
        self.lock().snapshot().to_vec()
    }
}

/// Exclusive access to the store's state.
pub struct StoreGuard<'a>(MutexGuard<'a, StoreInner>);

impl StoreGuard<'_> {
    /// Replace the snapshot with a freshly fetched one.
    pub fn replace_snapshot(&mut self, snapshot: Vec<Workspace>) {
        self.0.snapshot = snapshot;
    }

    /// The current snapshot, in compositor order.
    pub fn snapshot(&self) -> &[Workspace] {
        &self.0.snapshot
    }

    /// Atomically set the scroll flag if it is clear.
    ///
    /// Returns whether the flag was acquired.  A `false` return means a
    /// scroll-triggered switch is already in flight and the caller must
    /// back off.
    pub fn try_begin_scroll(&mut self) -> bool {
        if self.0.scrolling {
            false
        } else {
            self.0.scrolling = true;
            true
        }
    }

    /// Clear the scroll flag.  Idempotent.
    pub fn end_scroll(&mut self) {
        self.0.scrolling = false;
    }

    /// Whether a scroll-triggered switch is currently in flight.
    pub fn scrolling(&self) -> bool {
        self.0.scrolling
    }
}

/// The strip's resolved output identifier, shared between threads.
///
/// The output name may not be known at construction time (the surface
/// learns it when it is mapped onto a display).  The listener thread polls
/// [`get`](OutputName::get) and refuses to consume events until it is set,
/// so no workspace change is eaten before the strip can render it.
#[derive(Debug, Clone, Default)]
pub struct OutputName(Arc<OnceLock<String>>);

impl OutputName {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an already-resolved output name.
    pub fn resolved(name: impl Into<String>) -> Self {
        let cell = Self::default();
        cell.set(name.into());
        cell
    }

    /// Publish the output name.  Later calls are ignored — the identity of
    /// a strip never changes once known.
    pub fn set(&self, name: String) {
        let _ = self.0.set(name);
    }

    pub fn get(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(num: i32, focused: bool) -> Workspace {
        Workspace {
            num,
            name: num.to_string(),
            output: "eDP-1".into(),
            focused,
            visible: focused,
            urgent: false,
        }
    }

    #[test]
    fn replace_and_read_snapshot() {
        let store = WorkspaceStore::new();
        assert!(store.current_snapshot().is_empty());

        store.lock().replace_snapshot(vec![ws(1, true), ws(2, false)]);
        let snap = store.current_snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].num, 1);

        // A new snapshot fully replaces the old one.
        store.lock().replace_snapshot(vec![ws(3, true)]);
        let snap = store.current_snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].num, 3);
    }

    #[test]
    fn scroll_flag_is_exclusive() {
        let store = WorkspaceStore::new();
        let mut guard = store.lock();
        assert!(guard.try_begin_scroll());
        assert!(!guard.try_begin_scroll(), "second acquire must fail");
        guard.end_scroll();
        assert!(guard.try_begin_scroll());
    }

    #[test]
    fn end_scroll_is_idempotent() {
        let store = WorkspaceStore::new();
        let mut guard = store.lock();
        guard.end_scroll();
        guard.end_scroll();
        assert!(!guard.scrolling());
    }

    #[test]
    fn output_name_sets_once() {
        let output = OutputName::new();
        assert_eq!(output.get(), None);
        output.set("eDP-1".into());
        output.set("HDMI-A-1".into());
        assert_eq!(output.get(), Some("eDP-1"));
    }

    #[test]
    fn workspace_parses_compositor_json() {
        let json = r#"{
            "num": 3,
            "name": "3: web",
            "output": "eDP-1",
            "focused": true,
            "visible": true,
            "urgent": false,
            "rect": { "x": 0, "y": 0, "width": 1920, "height": 1080 }
        }"#;
        let ws: Workspace = serde_json::from_str(json).unwrap();
        assert_eq!(ws.num, 3);
        assert_eq!(ws.name, "3: web");
        assert_eq!(ws.output, "eDP-1");
        assert!(ws.focused && ws.visible && !ws.urgent);
    }
}
