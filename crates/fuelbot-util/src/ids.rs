//! Strongly-typed identifiers for fuelbot

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a monitored structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureId(i64);

impl StructureId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for StructureId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Inventory type identifier.
///
/// Structure hulls and tradeable commodities (fuel blocks) share this
/// namespace on the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTypeId(i32);

impl ItemTypeId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ItemTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ItemTypeId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Identifier of a chat channel (opaque snowflake string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a chat user (message author)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_id_equality() {
        let c1 = ChannelId::new("1234");
        let c2 = ChannelId::from("1234");
        let c3 = ChannelId::new("5678");

        assert_eq!(c1, c2);
        assert_ne!(c1, c3);
    }

    #[test]
    fn numeric_ids_serialize_transparently() {
        let structure = StructureId::new(1_035_466_617_946);
        let json = serde_json::to_string(&structure).unwrap();
        assert_eq!(json, "1035466617946");

        let parsed: ItemTypeId = serde_json::from_str("35832").unwrap();
        assert_eq!(parsed, ItemTypeId::new(35832));
    }

    #[test]
    fn ids_display_inner_value() {
        assert_eq!(StructureId::new(42).to_string(), "42");
        assert_eq!(ChannelId::new("chan").to_string(), "chan");
        assert_eq!(UserId::new("bot").as_str(), "bot");
    }
}
