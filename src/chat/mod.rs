//! Terminal front end for specialist consultations.
//!
//! This module provides the REPL pieces built on top of the controller:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing
//!
//! Rendering lives in [`crate::render`].

mod commands;
mod config;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
