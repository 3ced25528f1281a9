//! EVE ESI and SSO implementation of the fuelbot data providers
//!
//! - File-backed SSO token source with refresh-token renewal
//! - Corporation structure listing (character -> corporation -> structures)
//! - Regional market history for fuel commodities

mod client;
mod sso;
mod token;

pub use client::*;
pub use sso::*;
pub use token::*;

use fuelbot_provider_api::FetchError;
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("EVE FuelBot/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}

pub(crate) fn fetch_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Request(e.to_string())
    }
}
