//! Network error types

use std::io;

/// Network result type
pub type Result<T> = std::result::Result<T, Error>;

/// Network errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Declared length {declared} exceeds limit of {max} bytes")]
    LengthOutOfBounds { declared: u32, max: u32 },

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
