//! The i3 IPC frame codec.
//!
//! Every message on the socket, in either direction, is framed as:
//!
//! ```text
//! "i3-ipc" | length: u32 LE | type: u32 LE | payload: length bytes
//! ```
//!
//! where `length` counts payload bytes only.  The protocol carries no
//! request identifiers, so replies can only be correlated by ordering —
//! a request/response exchange must be exclusive on its connection.
//! [`Connection`] encodes that in the type system: every operation takes
//! `&mut self`, and callers that share a connection across threads wrap
//! it in a `Mutex`.

use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;

/// Frame preamble, shared by requests, replies and event notifications.
pub const MAGIC: &[u8; 6] = b"i3-ipc";

/// Magic + length + type.
const HEADER_LEN: usize = MAGIC.len() + 8;

/// Request type codes, matching the compositor's published numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    RunCommand = 0,
    GetWorkspaces = 1,
    Subscribe = 2,
}

impl MessageType {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Errors produced by the frame codec.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad frame magic {0:?}, expected \"i3-ipc\"")]
    BadMagic([u8; 6]),
    #[error("neither SWAYSOCK nor I3SOCK is set")]
    NoSocket,
}

/// One connection to the IPC socket.
///
/// A strip holds two of these for its whole lifetime: one for commands
/// and queries, one subscribed to event notifications.  Both are closed
/// when dropped.
#[derive(Debug)]
pub struct Connection {
    stream: UnixStream,
}

impl Connection {
    /// Connect to the socket at `path`.
    ///
    /// Failure here is fatal to whatever is being constructed — there is
    /// no retry.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IpcError> {
        let stream = UnixStream::connect(path.as_ref())?;
        Ok(Self { stream })
    }

    pub(crate) fn from_stream(stream: UnixStream) -> Self {
        Self { stream }
    }

    /// Write one frame.
    pub fn send(&mut self, msg_type: MessageType, payload: &[u8]) -> Result<(), IpcError> {
        let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
        frame.extend_from_slice(MAGIC);
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&msg_type.code().to_le_bytes());
        frame.extend_from_slice(payload);
        self.stream.write_all(&frame)?;
        Ok(())
    }

    /// Block for one frame and return its raw type code and payload.
    ///
    /// Event notifications carry type codes outside [`MessageType`] (the
    /// compositor sets the high bit), so the type is returned untyped.
    /// A frame that ends early surfaces as [`IpcError::Io`] with
    /// `UnexpectedEof`.
    pub fn receive(&mut self) -> Result<(u32, Vec<u8>), IpcError> {
        let mut header = [0u8; HEADER_LEN];
        self.stream.read_exact(&mut header)?;
        if &header[..MAGIC.len()] != MAGIC {
            let mut found = [0u8; 6];
            found.copy_from_slice(&header[..MAGIC.len()]);
            return Err(IpcError::BadMagic(found));
        }
        let len = u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;
        let msg_type = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);
        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        Ok((msg_type, payload))
    }

    /// Send a request and block for its reply, as one exchange.
    ///
    /// The `&mut self` receiver is the critical section: nothing else can
    /// touch this connection between the request going out and the reply
    /// coming back.
    pub fn send_and_receive(
        &mut self,
        msg_type: MessageType,
        payload: &[u8],
    ) -> Result<Vec<u8>, IpcError> {
        self.send(msg_type, payload)?;
        let (_, reply) = self.receive()?;
        Ok(reply)
    }

    /// A second handle to the underlying socket, usable to shut the
    /// connection down from another thread and unblock a pending
    /// [`receive`](Connection::receive).
    pub fn shutdown_handle(&self) -> Result<ShutdownHandle, IpcError> {
        Ok(ShutdownHandle(self.stream.try_clone()?))
    }
}

/// Cloned socket handle that can interrupt a blocked reader.
#[derive(Debug)]
pub struct ShutdownHandle(UnixStream);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.0.shutdown(Shutdown::Both);
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Connection, UnixStream) {
        let (ours, theirs) = UnixStream::pair().expect("socketpair");
        (Connection::from_stream(ours), theirs)
    }

    #[test]
    fn send_writes_exact_frame_bytes() {
        let (mut conn, mut peer) = pair();
        conn.send(MessageType::RunCommand, b"workspace \"3\"").unwrap();

        let mut buf = vec![0u8; HEADER_LEN + 13];
        peer.read_exact(&mut buf).unwrap();
        assert_eq!(&buf[..6], b"i3-ipc");
        assert_eq!(&buf[6..10], &13u32.to_le_bytes());
        assert_eq!(&buf[10..14], &0u32.to_le_bytes());
        assert_eq!(&buf[14..], b"workspace \"3\"");
    }

    #[test]
    fn subscribe_frame_carries_type_code_two() {
        let (mut conn, mut peer) = pair();
        conn.send(MessageType::Subscribe, br#"["workspace"]"#).unwrap();

        let mut buf = vec![0u8; HEADER_LEN + 13];
        peer.read_exact(&mut buf).unwrap();
        assert_eq!(&buf[10..14], &2u32.to_le_bytes());
        assert_eq!(&buf[14..], br#"["workspace"]"#);
    }

    #[test]
    fn receive_parses_frame() {
        let (mut conn, mut peer) = pair();
        let mut frame = Vec::new();
        frame.extend_from_slice(b"i3-ipc");
        frame.extend_from_slice(&2u32.to_le_bytes());
        frame.extend_from_slice(&1u32.to_le_bytes());
        frame.extend_from_slice(b"[]");
        peer.write_all(&frame).unwrap();

        let (msg_type, payload) = conn.receive().unwrap();
        assert_eq!(msg_type, MessageType::GetWorkspaces.code());
        assert_eq!(payload, b"[]");
    }

    #[test]
    fn bad_magic_is_a_protocol_error() {
        let (mut conn, mut peer) = pair();
        peer.write_all(b"not-ipc\0\0\0\0\0\0\0").unwrap();
        let err = conn.receive().unwrap_err();
        assert!(matches!(err, IpcError::BadMagic(_)), "got {err:?}");
    }

    #[test]
    fn truncated_frame_is_an_error() {
        let (mut conn, peer) = pair();
        {
            let mut peer = peer;
            peer.write_all(b"i3-ipc").unwrap();
            peer.write_all(&10u32.to_le_bytes()).unwrap();
            // Connection closes before type and payload arrive.
        }
        let err = conn.receive().unwrap_err();
        assert!(matches!(err, IpcError::Io(_)), "got {err:?}");
    }

    #[test]
    fn send_and_receive_round_trip() {
        let (mut conn, theirs) = pair();
        let server = std::thread::spawn(move || {
            let mut server = Connection::from_stream(theirs);
            let (msg_type, payload) = server.receive().unwrap();
            assert_eq!(msg_type, MessageType::GetWorkspaces.code());
            assert!(payload.is_empty());
            server.send(MessageType::GetWorkspaces, b"[]").unwrap();
        });

        let reply = conn
            .send_and_receive(MessageType::GetWorkspaces, b"")
            .unwrap();
        assert_eq!(reply, b"[]");
        server.join().unwrap();
    }

    #[test]
    fn shutdown_handle_unblocks_reader() {
        let (mut conn, _peer) = pair();
        let handle = conn.shutdown_handle().unwrap();
        let reader = std::thread::spawn(move || conn.receive());
        std::thread::sleep(std::time::Duration::from_millis(50));
        handle.shutdown();
        assert!(reader.join().unwrap().is_err());
    }
}
