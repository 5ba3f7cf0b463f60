//! Partyline terminal application
//!
//! The hub process: hosts (or dials) the encrypted transport from
//! `partyline-net`, routes messages through the contact directory from
//! `partyline-core`, and drives a single-task terminal event loop that
//! interleaves keyboard input, inbound network events, and redraws.

pub mod app;
pub mod commands;
pub mod input;
pub mod runtime;
pub mod ui;

pub use app::App;
pub use commands::Command;
pub use input::{InputEffect, InputState, KeyInput};
pub use runtime::{Runtime, RuntimeError};
