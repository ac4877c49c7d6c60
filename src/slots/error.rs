//! Slot registry error types

use thiserror::Error;

/// Slot allocation errors
///
/// Conflict and Expired are expected, user-facing outcomes: the caller
/// retries with a different rank or restarts the flow. They are never
/// auto-retried here because a retry could double-allocate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Rank is already held by another freelancer")]
    RankTaken,

    #[error("Freelancer already holds a rank in this category and area")]
    ScopeOccupied,

    #[error("Reservation hold has expired")]
    Expired,
}

impl SlotError {
    /// Error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            SlotError::RankTaken => "RANK_TAKEN",
            SlotError::ScopeOccupied => "SCOPE_OCCUPIED",
            SlotError::Expired => "HOLD_EXPIRED",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            SlotError::RankTaken | SlotError::ScopeOccupied => 409,
            SlotError::Expired => 410,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(SlotError::RankTaken.code(), "RANK_TAKEN");
        assert_eq!(SlotError::ScopeOccupied.code(), "SCOPE_OCCUPIED");
        assert_eq!(SlotError::Expired.code(), "HOLD_EXPIRED");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(SlotError::RankTaken.http_status(), 409);
        assert_eq!(SlotError::ScopeOccupied.http_status(), 409);
        assert_eq!(SlotError::Expired.http_status(), 410);
    }
}
