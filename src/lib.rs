//! **swaystrip** — a per-output workspace button strip for sway.
//!
//! One strip instance tracks the compositor's workspace list over the i3
//! IPC socket and keeps a row of buttons — one per workspace on its output
//! — in sync with it.  Scrolling anywhere on the strip switches to the
//! next or previous workspace, with wraparound.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowManager`] — abstracts workspace queries and command
//!   execution so the strip logic is not coupled to any specific
//!   compositor connection.
//! * [`traits::ButtonSurface`] — abstracts button creation, CSS classes
//!   and ordering so the strip is not coupled to any specific widget
//!   toolkit.
//!
//! Concrete IPC plumbing lives in [`sway`] (socket discovery, the binary
//! frame codec, the command client and the event listener thread).  The
//! diff-based rendering logic lives in [`bar`].

pub mod bar;
pub mod config;
pub mod event;
pub mod state;
pub mod sway;
pub mod traits;
