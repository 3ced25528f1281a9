//! Shared utilities for fuelbot
//!
//! This crate provides:
//! - ID types (StructureId, ItemTypeId, ChannelId, UserId)
//! - Wall-clock time with a debug-build mock override
//! - Human-readable duration and relative-time formatting
//! - Rate limiting helpers
//! - Default paths for config and data directories

mod ids;
mod paths;
mod rate_limit;
mod time;

pub use ids::*;
pub use paths::*;
pub use rate_limit::*;
pub use time::*;
