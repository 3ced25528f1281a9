//! Fuel monitoring engine for fuelbot
//!
//! This crate holds everything with state or timing in it:
//! - Daily fuel consumption from structure type and online services
//! - Notification deduplication with a refuel window and a cooldown
//! - Moving-average price estimation over market history
//! - The polling loop and the on-demand status path
//! - Inbound command dispatch

mod collaborators;
mod commands;
mod consumption;
mod dedup;
mod monitor;
mod pricing;
mod status;

pub use collaborators::*;
pub use commands::*;
pub use consumption::*;
pub use dedup::*;
pub use monitor::*;
pub use pricing::*;
pub use status::*;
