//! sway-specific plumbing.
//!
//! This module provides everything that touches the compositor's i3 IPC
//! socket: path discovery, the binary frame codec ([`ipc`]), the command
//! client ([`client`]) and the event listener thread ([`listener`]).
//!
//! Nothing outside this module should reference the wire protocol
//! directly.

pub mod client;
pub mod ipc;
pub mod listener;

use crate::sway::ipc::IpcError;
use std::path::PathBuf;

/// Resolve the compositor's IPC socket path.
///
/// sway exports it as `$SWAYSOCK`; `$I3SOCK` is honoured as a fallback so
/// the strip also runs under i3.
pub fn socket_path() -> Result<PathBuf, IpcError> {
    std::env::var("SWAYSOCK")
        .or_else(|_| std::env::var("I3SOCK"))
        .map(PathBuf::from)
        .map_err(|_| IpcError::NoSocket)
}
