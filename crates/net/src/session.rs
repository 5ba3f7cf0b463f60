//! Session identity, state machine, and writer task
//!
//! A session is one peer's live encrypted connection. The hub owns the
//! registry entry; the read loop and writer task run as detached tasks
//! that outlive neither the registry entry's channel nor the hub's
//! shutdown signal.

use std::fmt;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

/// Identity of one attached session, assigned monotonically on attach.
///
/// Ordering follows attach order, which is what gives broadcast its
/// registration-order delivery guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub(crate) u64);

impl SessionId {
    /// Construct an id from a raw value. Ids are normally assigned by
    /// the hub; this exists for consumers that fabricate events.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Session lifecycle: `Connecting -> Open -> Closing -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Accepted, handshake done, not yet registered.
    Connecting,
    /// Registered with the hub and eligible for broadcast.
    Open,
    /// A write failed; awaiting deregistration.
    Closing,
    /// Deregistered.
    Closed,
}

/// Registry entry for one attached peer connection.
pub(crate) struct Session {
    pub(crate) id: SessionId,
    pub(crate) label: String,
    pub(crate) tx: mpsc::Sender<Vec<u8>>,
    pub(crate) state: SessionState,
}

impl Session {
    pub(crate) fn new(id: SessionId, label: String, tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            id,
            label,
            tx,
            state: SessionState::Connecting,
        }
    }

    pub(crate) fn open(&mut self) {
        self.state = SessionState::Open;
    }

    pub(crate) fn begin_close(&mut self) {
        if self.state == SessionState::Open {
            self.state = SessionState::Closing;
        }
    }

    pub(crate) fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open | SessionState::Connecting)
    }
}

/// Writer task: drains pre-encoded frame bytes onto the stream.
///
/// Ends when the channel closes (session removed) or a write fails
/// (broken pipe); either way the stream is shut down on the way out.
pub(crate) async fn writer_task<W: AsyncWrite + Unpin>(
    mut writer: W,
    mut rx: mpsc::Receiver<Vec<u8>>,
    id: SessionId,
) {
    while let Some(bytes) = rx.recv().await {
        if let Err(e) = writer.write_all(&bytes).await {
            debug!(%id, error = %e, "Write failed");
            break;
        }
        if let Err(e) = writer.flush().await {
            debug!(%id, error = %e, "Flush failed");
            break;
        }
    }
    let _ = writer.shutdown().await;
    debug!(%id, "Writer task finished");
}
