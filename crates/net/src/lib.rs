//! Partyline Network Library
//!
//! TLS-encrypted chat transport for the Partyline hub.
//!
//! # Architecture
//!
//! - **Frame**: kind byte + 4-byte big-endian length + payload
//! - **Session**: one peer connection with a read loop and a writer task
//! - **Hub**: owns the active session set, accepts connections, fans
//!   outbound frames to every attached session
//!
//! # Usage
//!
//! ```ignore
//! let (hub, mut events) = Hub::new();
//! hub.listen(addr, acceptor).await?;
//!
//! hub.broadcast(KIND_CHAT, b"5551234/hello").await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         HubEvent::Message { message, .. } => { /* display */ }
//!         _ => {}
//!     }
//! }
//! ```

pub mod error;
pub mod frame;
pub mod hub;
pub mod protocol;
pub mod session;
pub mod tls;

pub use error::{Error, Result};
pub use frame::{read_frame, write_frame, Frame, KIND_CHAT, MAX_PAYLOAD};
pub use hub::{Hub, HubEvent};
pub use protocol::RoutedMessage;
pub use session::{SessionId, SessionState};

/// Default port for Partyline hubs
pub const DEFAULT_PORT: u16 = 6215;
