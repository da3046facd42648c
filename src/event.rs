//! Events processed by the strip's consumer loop.
//!
//! This module defines the vocabulary that all components share:
//! [`BarEvent`] describes everything the consumer loop can be asked to do,
//! and [`Scroll`] carries the raw gesture data a surface reports.
//!
//! The event listener thread and the button surface both hold a clone of
//! the same [`mpsc::Sender`](std::sync::mpsc::Sender)`<BarEvent>`; the
//! receiving end is drained by a single loop, which is the only code that
//! ever touches rendered state.

use std::fmt;

/// A scroll gesture as reported by the surface.
///
/// Discrete wheel events arrive as [`Up`](Scroll::Up) / [`Down`](Scroll::Down);
/// touchpad scrolling arrives as [`Smooth`](Scroll::Smooth) with the raw
/// vertical delta.  A negative delta means the same thing as `Up`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scroll {
    Up,
    Down,
    /// Smooth scrolling with the vertical delta.  Negative scrolls up.
    Smooth(f64),
}

impl fmt::Display for Scroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scroll::Up => write!(f, "up"),
            Scroll::Down => write!(f, "down"),
            Scroll::Smooth(d) => write!(f, "smooth({:+.2})", d),
        }
    }
}

/// One unit of work for the consumer loop.
#[derive(Debug, Clone, PartialEq)]
pub enum BarEvent {
    /// A fresh snapshot has been stored; run one reconciliation pass.
    ///
    /// Carries no data on purpose: the pass reads the store under its
    /// lock, so a burst of refreshes coalesces onto the latest snapshot
    /// and duplicates are harmless.
    Refresh,
    /// The button for workspace `num` was clicked.
    Clicked(i32),
    /// A scroll gesture happened somewhere on the strip.
    Scrolled(Scroll),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_display() {
        assert_eq!(Scroll::Up.to_string(), "up");
        assert_eq!(Scroll::Down.to_string(), "down");
        assert_eq!(Scroll::Smooth(-1.5).to_string(), "smooth(-1.50)");
    }
}
