//! Error types for Partyline Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid address '{0}': must be digits only")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
