//! Core types for Pony Core
//!
//! Defines the record the whole screen revolves around:
//! - Pony identifiers
//! - Color tags (select the presentation asset)
//! - The pony record itself and the default seed

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque, stable pony identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PonyId(String);

impl PonyId {
    /// Create identifier from any string
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PonyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PonyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PonyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Color tag of a pony
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PonyColor {
    Blue,
    Green,
    Orange,
    Purple,
    Yellow,
}

impl PonyColor {
    /// All known colors
    pub const ALL: [PonyColor; 5] = [
        Self::Blue,
        Self::Green,
        Self::Orange,
        Self::Purple,
        Self::Yellow,
    ];

    /// Lowercase tag as used in URLs and asset names
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Purple => "purple",
            Self::Yellow => "yellow",
        }
    }
}

impl fmt::Display for PonyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown color tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pony color: {0:?}")]
pub struct UnknownColor(pub String);

impl FromStr for PonyColor {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|color| color.as_str() == s)
            .ok_or_else(|| UnknownColor(s.to_string()))
    }
}

/// A pony record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pony {
    /// Unique identifier
    pub id: PonyId,
    /// Display name, matched by searches
    pub name: String,
    /// Color tag
    pub color: PonyColor,
}

impl Pony {
    /// Create new pony
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<PonyId>, name: impl Into<String>, color: PonyColor) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
        }
    }

    /// Case-insensitive containment match on the display name
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Records the in-memory backend starts with
#[must_use]
pub fn default_seed() -> Vec<Pony> {
    vec![
        Pony::new("p1", "Blue mystery", PonyColor::Blue),
        Pony::new("p2", "Green landscape", PonyColor::Green),
        Pony::new("p3", "Orange light", PonyColor::Orange),
        Pony::new("p4", "Purple rain", PonyColor::Purple),
        Pony::new("p5", "Yellow stone", PonyColor::Yellow),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_round_trips_through_str() {
        for color in PonyColor::ALL {
            assert_eq!(color.as_str().parse::<PonyColor>(), Ok(color));
        }
        assert_eq!(
            "pink".parse::<PonyColor>(),
            Err(UnknownColor("pink".to_string()))
        );
    }

    #[test]
    fn pony_matches_case_insensitively() {
        let pony = Pony::new("p1", "Blue mystery", PonyColor::Blue);
        assert!(pony.matches("b"));
        assert!(pony.matches("MYST"));
        assert!(pony.matches(""));
        assert!(!pony.matches("rain"));
    }

    #[test]
    fn pony_json_shape() {
        let pony = Pony::new("p4", "Purple rain", PonyColor::Purple);
        let json = serde_json::to_value(&pony).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "p4", "name": "Purple rain", "color": "purple"})
        );
    }

    #[test]
    fn default_seed_has_unique_ids() {
        let seed = default_seed();
        let mut ids: Vec<_> = seed.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), seed.len());
        assert_eq!(seed[0].id.as_str(), "p1");
    }
}
