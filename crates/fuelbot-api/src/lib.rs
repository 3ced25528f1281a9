//! Domain types shared across fuelbot crates
//!
//! This crate defines the data exchanged between the monitoring core and its
//! collaborators:
//! - Structure snapshots and market history samples
//! - Outbound message payloads (title, color, fields, timestamp)
//! - Inbound chat commands

mod commands;
mod message;
mod types;

pub use commands::*;
pub use message::*;
pub use types::*;
