//! Partyline Core Library
//!
//! Contact directory and its JSON persistence for the Partyline hub.

pub mod contacts;
pub mod error;

pub use contacts::{Contact, ContactDirectory};
pub use error::{Error, Result};
