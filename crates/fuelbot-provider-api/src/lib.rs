//! Collaborator trait interfaces for fuelbot
//!
//! This crate defines the boundary between the monitoring core and the
//! services it talks to: the credential source, the structure and market data
//! provider, and the notification sink. It contains no network code itself.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
