//! Core traits that decouple the strip from any specific compositor
//! connection or widget toolkit.
//!
//! Every concrete backend (the sway IPC client, a GTK button row, a test
//! harness, …) implements one of these traits.  The
//! [`WorkspaceBar`](crate::bar::WorkspaceBar) only depends on these
//! abstractions.

use crate::state::Workspace;

/// Abstraction over a window manager that can list workspaces and execute
/// commands.
///
/// An implementation might talk to sway over its IPC socket, or it might
/// be a recording stub used in tests.
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Fetch the full workspace list, in the order the compositor
    /// reports it.
    fn workspaces(&self) -> Result<Vec<Workspace>, Self::Error>;

    /// Execute a command, e.g. `workspace "3"`.
    ///
    /// Returns once the compositor has acknowledged it.
    fn run_command(&self, command: &str) -> Result<(), Self::Error>;
}

/// Abstraction over the widget surface the strip renders onto.
///
/// The surface owns the actual widgets; the strip only holds the opaque
/// [`Handle`](ButtonSurface::Handle)s it is given back.  All methods are
/// called from the consumer thread, never from the listener thread.
///
/// Input travels the other way: a surface is constructed with a clone of
/// the consumer's [`mpsc::Sender`](std::sync::mpsc::Sender)`<`[`BarEvent`](crate::event::BarEvent)`>`
/// and reports clicks and scrolls through it, so every handler runs on
/// the one thread that owns rendered state.
pub trait ButtonSurface {
    /// Opaque per-button handle.
    type Handle;

    /// Create a button for workspace `num` with the given label and
    /// return its handle.  The button starts hidden and unclassed.
    fn create_button(&mut self, num: i32, label: &str) -> Self::Handle;

    /// Add (`on = true`) or remove (`on = false`) a CSS class.
    /// Idempotent in both directions.
    fn set_class(&mut self, handle: &Self::Handle, class: &str, on: bool);

    /// Move the button to `position` within the strip.
    fn reorder(&mut self, handle: &Self::Handle, position: i32);

    /// Make the button visible.
    fn show(&mut self, handle: &Self::Handle);

    /// Destroy the button.
    fn remove(&mut self, handle: Self::Handle);
}
