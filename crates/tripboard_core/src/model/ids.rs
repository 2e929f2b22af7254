//! Identifiers for trip points
//!
//! Points loaded from a backend carry the backend's id. Points created on
//! the client get a provisional id derived from the current timestamp.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Unique identifier for a trip point
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub String);

impl PointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Client-side id for a point that has not been stored yet.
    pub fn generate(now: Timestamp) -> Self {
        Self(now.as_millisecond().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uses_milliseconds() {
        let ts = Timestamp::from_millisecond(1_563_000_000_123).unwrap();
        assert_eq!(PointId::generate(ts).as_str(), "1563000000123");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&PointId::from("42")).unwrap();
        assert_eq!(json, "\"42\"");
    }
}
