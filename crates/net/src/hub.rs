//! Connection hub
//!
//! Owns the set of active sessions: accepts TLS connections, runs a read
//! loop per session, and fans outbound frames to every attached session.
//! No session outlives its registry entry here.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_rustls::{TlsAcceptor, TlsConnector};
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::frame::{read_frame, Frame};
use crate::protocol::RoutedMessage;
use crate::session::{writer_task, Session, SessionId};

/// Per-session outbound queue depth
const OUTBOUND_QUEUE: usize = 64;

/// Hub event queue depth
const EVENT_QUEUE: usize = 64;

/// Event delivered to the display layer.
#[derive(Debug, Clone)]
pub enum HubEvent {
    /// A peer attached (accepted or dialed out).
    Connected { session: SessionId, label: String },
    /// A peer detached: disconnect signal, stream close, or read error.
    Disconnected { session: SessionId, label: String },
    /// A decoded chat message from a peer.
    Message {
        session: SessionId,
        message: RoutedMessage,
    },
}

struct HubState {
    sessions: BTreeMap<SessionId, Session>,
}

/// Handle to the connection hub. Clones share the same session set.
#[derive(Clone)]
pub struct Hub {
    state: Arc<RwLock<HubState>>,
    event_tx: mpsc::Sender<HubEvent>,
    shutdown_tx: broadcast::Sender<()>,
    next_id: Arc<AtomicU64>,
}

impl Hub {
    /// Create a hub and the event channel its sessions report into.
    pub fn new() -> (Self, mpsc::Receiver<HubEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE);
        let (shutdown_tx, _) = broadcast::channel(1);

        let hub = Hub {
            state: Arc::new(RwLock::new(HubState {
                sessions: BTreeMap::new(),
            })),
            event_tx,
            shutdown_tx,
            next_id: Arc::new(AtomicU64::new(1)),
        };

        (hub, event_rx)
    }

    /// Bind a listener and spawn the accept loop.
    ///
    /// Returns the bound address. Bind failures are fatal to startup;
    /// per-connection handshake failures are logged and dropped.
    pub async fn listen(&self, addr: SocketAddr, acceptor: TlsAcceptor) -> Result<SocketAddr> {
        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?;

        info!(addr = %bound, "Hub listening");

        let hub = self.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(accept_loop(listener, acceptor, hub, shutdown_rx));

        Ok(bound)
    }

    /// Dial a remote hub and attach the connection as a session.
    pub async fn connect(
        &self,
        addr: &str,
        connector: TlsConnector,
        server_name: &str,
    ) -> Result<SessionId> {
        info!(addr = %addr, "Connecting to remote hub");

        let name = rustls::pki_types::ServerName::try_from(server_name.to_owned())
            .map_err(|e| Error::Config(format!("invalid server name '{server_name}': {e}")))?;

        let tcp = TcpStream::connect(addr).await?;
        let stream = connector.connect(name, tcp).await?;

        Ok(self.attach(stream, addr.to_string()).await)
    }

    /// Register a duplex stream as a session and start its read loop
    /// and writer task. Posts a `Connected` event.
    pub async fn attach<S>(&self, stream: S, label: String) -> SessionId
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (reader, writer) = tokio::io::split(stream);
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);

        {
            let mut s = self.state.write().await;
            s.sessions.insert(id, Session::new(id, label.clone(), tx));
        }

        tokio::spawn(writer_task(writer, rx, id));

        let hub = self.clone();
        let shutdown_rx = self.shutdown_tx.subscribe();
        let read_label = label.clone();
        tokio::spawn(async move {
            read_loop(reader, id, &hub, shutdown_rx).await;
            hub.remove(id).await;
            let _ = hub
                .event_tx
                .send(HubEvent::Disconnected {
                    session: id,
                    label: read_label,
                })
                .await;
        });

        {
            let mut s = self.state.write().await;
            if let Some(session) = s.sessions.get_mut(&id) {
                session.open();
            }
        }

        info!(%id, label = %label, "Session attached");
        let _ = self
            .event_tx
            .send(HubEvent::Connected { session: id, label })
            .await;

        id
    }

    /// Encode once and send the identical frame bytes to every attached
    /// session, in registration order.
    ///
    /// Per-session failures are isolated: a failing session is removed,
    /// the rest still receive the frame. Returns the delivered count;
    /// zero attached sessions is not an error.
    pub async fn broadcast(&self, kind: u8, payload: &[u8]) -> Result<usize> {
        let frame = Frame::new(kind, payload.to_vec())?;
        let bytes = frame.encode();

        // Snapshot under the lock so a concurrent remove cannot
        // invalidate the iteration
        let targets: Vec<(SessionId, mpsc::Sender<Vec<u8>>)> = {
            let s = self.state.read().await;
            s.sessions
                .values()
                .filter(|session| session.is_open())
                .map(|session| (session.id, session.tx.clone()))
                .collect()
        };

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (id, tx) in targets {
            if tx.send(bytes.clone()).await.is_ok() {
                delivered += 1;
            } else {
                warn!(%id, "Send failed, dropping session");
                failed.push(id);
            }
        }

        for id in failed {
            {
                let mut s = self.state.write().await;
                if let Some(session) = s.sessions.get_mut(&id) {
                    session.begin_close();
                }
            }
            self.remove(id).await;
        }

        Ok(delivered)
    }

    /// Deregister and close a session. Idempotent: removing an
    /// already-removed session is a no-op.
    pub async fn remove(&self, id: SessionId) {
        let removed = {
            let mut s = self.state.write().await;
            s.sessions.remove(&id)
        };

        if let Some(mut session) = removed {
            session.close();
            debug!(%id, label = %session.label, "Session removed");
        }
        // Dropping the entry drops its sender, which ends the writer task
    }

    /// Number of currently attached sessions.
    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    /// Signal shutdown: the accept loop stops and every session's read
    /// loop exits at its next suspension point, closing its stream.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        info!("Hub shutdown initiated");
    }
}

/// Accept incoming connections until shutdown.
async fn accept_loop(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    hub: Hub,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        debug!(addr = %addr, "New connection");
                        let acceptor = acceptor.clone();
                        let hub = hub.clone();
                        tokio::spawn(async move {
                            match acceptor.accept(stream).await {
                                Ok(tls) => {
                                    hub.attach(tls, addr.to_string()).await;
                                }
                                Err(e) => {
                                    warn!(addr = %addr, error = %e, "TLS handshake failed");
                                }
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Accept failed");
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Accept loop shutting down");
                break;
            }
        }
    }
}

/// Read loop: decode frames and forward routed messages until the peer
/// disconnects, the frame stream turns malformed, or shutdown arrives.
///
/// Errors are contained here; they end this session and never unwind
/// into the hub.
async fn read_loop<R: AsyncRead + Unpin>(
    mut reader: R,
    id: SessionId,
    hub: &Hub,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        let frame = tokio::select! {
            result = read_frame(&mut reader) => result,
            _ = shutdown_rx.recv() => {
                debug!(%id, "Read loop shutting down");
                break;
            }
        };

        match frame {
            Ok(frame) if frame.is_empty() => {
                debug!(%id, "Peer sent disconnect signal");
                break;
            }
            Ok(frame) => match RoutedMessage::from_payload(frame.payload()) {
                Ok(message) => {
                    let event = HubEvent::Message {
                        session: id,
                        message,
                    };
                    if hub.event_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(%id, error = %e, "Malformed payload, closing session");
                    break;
                }
            },
            Err(Error::ConnectionClosed) => {
                debug!(%id, "Connection closed");
                break;
            }
            Err(e) => {
                warn!(%id, error = %e, "Read error, closing session");
                break;
            }
        }
    }
}
