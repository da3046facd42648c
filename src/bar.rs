//! The workspace strip itself: diff-based rendering plus scroll
//! navigation.
//!
//! [`WorkspaceBar`] owns the rendered button set and runs entirely on the
//! consumer thread.  Each [`BarEvent::Refresh`] triggers one
//! reconciliation pass that converts whatever is currently rendered into
//! the latest snapshot with minimal churn: stale buttons are removed,
//! new ones created, surviving ones get their `focused` / `visible` /
//! `urgent` classes set or cleared in place.
//!
//! The whole pass runs under the store lock, so the listener thread can
//! never swap the snapshot out from under a diff.

use crate::config::Config;
use crate::event::{BarEvent, Scroll};
use crate::state::{OutputName, Workspace, WorkspaceStore};
use crate::traits::{ButtonSurface, WindowManager};
use log::{debug, error};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How long a scroll-triggered switch suppresses further scroll input, so
/// a burst of smooth-scroll deltas collapses into one switch.
const SCROLL_DEBOUNCE: Duration = Duration::from_millis(150);

/// Resolve the label shown on a workspace button.
///
/// Precedence: exact `format-icons` match, then the `"default"` entry,
/// then the name itself.
pub fn resolve_icon<'a>(name: &'a str, icons: &'a HashMap<String, String>) -> &'a str {
    icons
        .get(name)
        .or_else(|| icons.get("default"))
        .map(String::as_str)
        .unwrap_or(name)
}

/// One strip of workspace buttons for a single output.
///
/// Generic over the compositor seam and the widget seam, so the same
/// logic drives a real bar and the test harness.
pub struct WorkspaceBar<W: WindowManager, S: ButtonSurface> {
    wm: Arc<W>,
    store: Arc<WorkspaceStore>,
    output: OutputName,
    format_icons: HashMap<String, String>,
    surface: S,
    /// Rendered buttons, keyed by workspace number.  Always a subset of
    /// the latest snapshot's numbers on this output.
    buttons: BTreeMap<i32, S::Handle>,
}

impl<W: WindowManager, S: ButtonSurface> WorkspaceBar<W, S> {
    pub fn new(
        wm: Arc<W>,
        store: Arc<WorkspaceStore>,
        output: OutputName,
        config: &Config,
        surface: S,
    ) -> Self {
        Self {
            wm,
            store,
            output,
            format_icons: config.format_icons.clone(),
            surface,
            buttons: BTreeMap::new(),
        }
    }

    /// Process one unit of work from the consumer channel.
    pub fn handle(&mut self, event: BarEvent) {
        match event {
            BarEvent::Refresh => self.update(),
            BarEvent::Clicked(num) => self.handle_click(num),
            BarEvent::Scrolled(scroll) => {
                self.handle_scroll(scroll);
            }
        }
    }

    /// One reconciliation pass: make the rendered set match the latest
    /// snapshot, filtered to this strip's output.  Idempotent.
    pub fn update(&mut self) {
        let mut store = self.store.lock();
        let output = match self.output.get() {
            Some(output) => output,
            // Nothing can be rendered yet, but a pass still closes the
            // scroll debounce window.
            None => {
                store.end_scroll();
                return;
            }
        };
        let snapshot = store.snapshot().to_vec();

        let mut need_reorder = false;

        // Drop buttons for workspaces that left this output.
        let live: HashSet<i32> = snapshot
            .iter()
            .filter(|ws| ws.output == output)
            .map(|ws| ws.num)
            .collect();
        let dead: Vec<i32> = self
            .buttons
            .keys()
            .copied()
            .filter(|num| !live.contains(num))
            .collect();
        for num in dead {
            if let Some(handle) = self.buttons.remove(&num) {
                self.surface.remove(handle);
                need_reorder = true;
            }
        }

        // Create or refresh one button per workspace on this output.
        for ws in snapshot.iter().filter(|ws| ws.output == output) {
            match self.buttons.get(&ws.num) {
                None => {
                    debug!("workspace {} appeared on {}", ws.num, output);
                    let label = resolve_icon(&ws.name, &self.format_icons);
                    let handle = self.surface.create_button(ws.num, label);
                    if label != ws.name {
                        self.surface.set_class(&handle, "icon", true);
                    }
                    if ws.focused {
                        self.surface.set_class(&handle, "focused", true);
                    }
                    if ws.visible {
                        self.surface.set_class(&handle, "visible", true);
                    }
                    if ws.urgent {
                        self.surface.set_class(&handle, "urgent", true);
                    }
                    self.surface.show(&handle);
                    self.buttons.insert(ws.num, handle);
                    need_reorder = true;
                }
                Some(handle) => {
                    self.surface.set_class(handle, "focused", ws.focused);
                    self.surface.set_class(handle, "visible", ws.visible);
                    self.surface.set_class(handle, "urgent", ws.urgent);
                    self.surface.show(handle);
                }
            }
        }

        // Raw workspace numbers double as strip positions.
        if need_reorder {
            for (num, handle) in &self.buttons {
                self.surface.reorder(handle, *num);
            }
        }

        // Closing the debounce window: the scroll flag is released here,
        // never by the scroll handler itself.
        store.end_scroll();
    }

    /// Switch to the workspace whose button was clicked.  Errors are
    /// logged and swallowed — a failed click is a no-op.
    fn handle_click(&mut self, num: i32) {
        if let Err(e) = self.wm.run_command(&format!("workspace \"{}\"", num)) {
            error!("workspace switch failed: {}", e);
        }
    }

    /// Translate a scroll gesture into a workspace switch.
    ///
    /// Returns whether the gesture was handled.  Scrolling up (or a
    /// negative smooth delta) goes to the next workspace in snapshot
    /// order, down to the previous one, both with wraparound.
    ///
    /// The store guard is held for the whole handler, including the
    /// debounce sleep; the scroll flag stays set until the reconciliation
    /// pass that follows the switch clears it.
    pub fn handle_scroll(&mut self, scroll: Scroll) -> bool {
        let mut store = self.store.lock();
        if !store.try_begin_scroll() {
            // A switch is already in flight.
            return false;
        }
        debug!("scroll {}", scroll);
        let snapshot = store.snapshot();
        let focused_idx = match snapshot.iter().position(|ws| ws.focused) {
            Some(idx) => idx,
            None => {
                store.end_scroll();
                return false;
            }
        };
        let focused_num = snapshot[focused_idx].num;
        let target = match scroll {
            Scroll::Up => next_workspace(snapshot, focused_idx),
            Scroll::Down => prev_workspace(snapshot, focused_idx),
            Scroll::Smooth(delta) if delta < 0.0 => next_workspace(snapshot, focused_idx),
            Scroll::Smooth(delta) if delta > 0.0 => prev_workspace(snapshot, focused_idx),
            Scroll::Smooth(_) => focused_num,
        };
        if target == focused_num {
            store.end_scroll();
            return false;
        }
        if let Err(e) = self.wm.run_command(&format!("workspace \"{}\"", target)) {
            error!("workspace switch failed: {}", e);
            store.end_scroll();
            return false;
        }
        // Collapse the rest of the burst into this one switch.
        thread::sleep(SCROLL_DEBOUNCE);
        true
    }
}

/// The workspace after the focused one in snapshot order, wrapping to the
/// first.
fn next_workspace(snapshot: &[Workspace], focused: usize) -> i32 {
    if focused + 1 < snapshot.len() {
        snapshot[focused + 1].num
    } else {
        snapshot[0].num
    }
}

/// The workspace before the focused one in snapshot order, wrapping to
/// the last.
fn prev_workspace(snapshot: &[Workspace], focused: usize) -> i32 {
    if focused > 0 {
        snapshot[focused - 1].num
    } else {
        snapshot[snapshot.len() - 1].num
    }
}

//  Tests
