//! Core types used throughout the system
//!
//! These are fundamental identifiers used by all modules.
//! They provide semantic meaning and enable future type evolution.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Freelancer ID - stable identity issued by the upstream identity provider.
///
/// The core never mints these; every call arrives with an already
/// authenticated id.
pub type FreelancerId = u64;

/// Customer ID - stable identity issued by the upstream identity provider.
pub type CustomerId = u64;

/// Category ID - service category (plumbing, tutoring, ...).
///
/// Small, sequential, immutable once assigned. Static catalog data is an
/// external collaborator; the core only keys on the id.
pub type CategoryId = u32;

/// Service area - normalized city/locality string.
///
/// Always stored lowercase via [`normalize_area`] so that key lookups never
/// depend on caller casing.
pub type Area = String;

/// Normalize an area string for use in slot and directory keys.
pub fn normalize_area(raw: &str) -> Area {
    raw.trim().to_lowercase()
}

/// Position rank - one of exactly three ordinal slots per (category, area).
///
/// Rank I outranks II outranks III in search-result priority. The numeric
/// form (1..=3) is the wire representation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Rank {
    First = 1,
    Second = 2,
    Third = 3,
}

impl Rank {
    /// All ranks, in priority order.
    pub const ALL: [Rank; 3] = [Rank::First, Rank::Second, Rank::Third];

    /// Zero-based index for fixed-size per-scope storage.
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Roman-numeral display form.
    pub fn as_str(self) -> &'static str {
        match self {
            Rank::First => "I",
            Rank::Second => "II",
            Rank::Third => "III",
        }
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank as u8
    }
}

impl TryFrom<u8> for Rank {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rank::First),
            2 => Ok(Rank::Second),
            3 => Ok(Rank::Third),
            other => Err(format!("rank must be 1..=3, got {}", other)),
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_roundtrip() {
        for rank in Rank::ALL {
            let n: u8 = rank.into();
            assert_eq!(Rank::try_from(n).unwrap(), rank);
        }
    }

    #[test]
    fn test_rank_rejects_out_of_range() {
        assert!(Rank::try_from(0).is_err());
        assert!(Rank::try_from(4).is_err());
    }

    #[test]
    fn test_rank_index() {
        assert_eq!(Rank::First.index(), 0);
        assert_eq!(Rank::Second.index(), 1);
        assert_eq!(Rank::Third.index(), 2);
    }

    #[test]
    fn test_normalize_area() {
        assert_eq!(normalize_area("  Indiranagar "), "indiranagar");
        assert_eq!(normalize_area("HSR Layout"), "hsr layout");
    }
}
