//! The command half of the IPC pair.
//!
//! [`CommandClient`] wraps the connection used for `GET_WORKSPACES`
//! queries and `RUN_COMMAND` requests.  Click handlers, the scroll
//! navigator and the event listener all share one client, so the
//! connection lives behind a mutex: each request/response exchange is one
//! critical section and nothing can interleave on the wire.

use crate::state::Workspace;
use crate::sway::ipc::{Connection, IpcError, MessageType};
use crate::traits::WindowManager;
use serde::Deserialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Errors produced by the command client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("ipc error: {0}")]
    Ipc(#[from] IpcError),
    #[error("malformed reply: {0}")]
    Json(#[from] serde_json::Error),
    #[error("command rejected: {0}")]
    Command(String),
}

/// Per-command entry of a `RUN_COMMAND` acknowledgement.
#[derive(Debug, Deserialize)]
struct CommandOutcome {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Issues state queries and commands over one dedicated connection.
pub struct CommandClient {
    conn: Mutex<Connection>,
}

impl CommandClient {
    /// Open the command connection.  Fatal on failure — the strip cannot
    /// exist without it.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self, IpcError> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    pub(crate) fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl WindowManager for CommandClient {
    type Error = ClientError;

    fn workspaces(&self) -> Result<Vec<Workspace>, ClientError> {
        let reply = self
            .conn()
            .send_and_receive(MessageType::GetWorkspaces, b"")?;
        Ok(serde_json::from_slice(&reply)?)
    }

    fn run_command(&self, command: &str) -> Result<(), ClientError> {
        let reply = self
            .conn()
            .send_and_receive(MessageType::RunCommand, command.as_bytes())?;
        let outcomes: Vec<CommandOutcome> = serde_json::from_slice(&reply)?;
        if let Some(failed) = outcomes.into_iter().find(|o| !o.success) {
            return Err(ClientError::Command(
                failed.error.unwrap_or_else(|| command.to_string()),
            ));
        }
        Ok(())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixStream;
    use std::thread;

    /// Play the compositor for one request: assert its type, answer with
    /// `reply`, and hand back the request payload.
    fn reply_once(
        stream: UnixStream,
        expect: MessageType,
        reply: &'static [u8],
    ) -> thread::JoinHandle<Vec<u8>> {
        thread::spawn(move || {
            let mut conn = Connection::from_stream(stream);
            let (msg_type, payload) = conn.receive().unwrap();
            assert_eq!(msg_type, expect.code());
            conn.send(expect, reply).unwrap();
            payload
        })
    }

    fn client_pair() -> (CommandClient, UnixStream) {
        let (ours, theirs) = UnixStream::pair().expect("socketpair");
        (
            CommandClient::from_connection(Connection::from_stream(ours)),
            theirs,
        )
    }

    #[test]
    fn workspaces_parses_reply() {
        let (client, theirs) = client_pair();
        let server = reply_once(
            theirs,
            MessageType::GetWorkspaces,
            br#"[
                {"num":1,"name":"1","output":"eDP-1","focused":true,"visible":true,"urgent":false},
                {"num":2,"name":"2: mail","output":"HDMI-A-1","focused":false,"visible":true,"urgent":true}
            ]"#,
        );

        let workspaces = client.workspaces().unwrap();
        assert_eq!(workspaces.len(), 2);
        assert_eq!(workspaces[0].num, 1);
        assert!(workspaces[0].focused);
        assert_eq!(workspaces[1].name, "2: mail");
        assert_eq!(workspaces[1].output, "HDMI-A-1");
        assert!(workspaces[1].urgent);

        let request = server.join().unwrap();
        assert!(request.is_empty(), "GET_WORKSPACES takes no payload");
    }

    #[test]
    fn run_command_sends_text_and_checks_ack() {
        let (client, theirs) = client_pair();
        let server = reply_once(theirs, MessageType::RunCommand, br#"[{"success":true}]"#);

        client.run_command("workspace \"3\"").unwrap();
        assert_eq!(server.join().unwrap(), b"workspace \"3\"");
    }

    #[test]
    fn run_command_surfaces_rejection() {
        let (client, theirs) = client_pair();
        let server = reply_once(
            theirs,
            MessageType::RunCommand,
            br#"[{"success":false,"error":"unknown command"}]"#,
        );

        let err = client.run_command("frobnicate").unwrap_err();
        match err {
            ClientError::Command(msg) => assert_eq!(msg, "unknown command"),
            other => panic!("expected Command error, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn garbage_reply_is_a_parse_error() {
        let (client, theirs) = client_pair();
        let server = reply_once(theirs, MessageType::GetWorkspaces, b"not json");

        let err = client.workspaces().unwrap_err();
        assert!(matches!(err, ClientError::Json(_)), "got {err:?}");
        server.join().unwrap();
    }
}
