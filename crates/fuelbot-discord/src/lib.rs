//! Discord REST transport for fuelbot
//!
//! Alerts and status replies are posted as embeds; inbound commands are
//! read by polling channel history, so no gateway connection is needed.

mod client;
mod embed;
mod listener;

pub use client::*;
pub use embed::*;
pub use listener::*;
