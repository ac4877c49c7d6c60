//! Payment order FSM states

use std::fmt;

/// Payment order states
///
/// Forward-monotonic except for the timeout edge. Terminal states:
/// VERIFIED (20), FAILED (-10), EXPIRED (-20); terminal orders are
/// immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum OrderState {
    /// Gateway order opened, amount and purpose validated
    Created = 0,

    /// Rank hold attached (position) or pass-through (lead plan / badge);
    /// awaiting the gateway callback
    Reserved = 10,

    /// Terminal: signature verified, slot committed, entitlement granted
    Verified = 20,

    /// Terminal: signature mismatch, gateway failure, or commit-after-expiry
    Failed = -10,

    /// Terminal: hold timed out before the callback arrived
    Expired = -20,
}

impl OrderState {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderState::Verified | OrderState::Failed | OrderState::Expired
        )
    }

    /// Numeric state ID
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from a numeric state ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(OrderState::Created),
            10 => Some(OrderState::Reserved),
            20 => Some(OrderState::Verified),
            -10 => Some(OrderState::Failed),
            -20 => Some(OrderState::Expired),
            _ => None,
        }
    }

    /// Human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Created => "CREATED",
            OrderState::Reserved => "RESERVED",
            OrderState::Verified => "VERIFIED",
            OrderState::Failed => "FAILED",
            OrderState::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
