//! Payment error types

use thiserror::Error;

use crate::slots::SlotError;

/// Payment orchestration errors
///
/// Conflict/expiry outcomes are expected and user-facing. SignatureMismatch
/// and ReconciliationRequired are escalated with full context before the
/// caller sees a user-safe message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Unknown payment order: {0}")]
    OrderNotFound(String),

    #[error("Client amount does not match the authoritative price")]
    AmountMismatch { expected_paise: i64 },

    #[error("Rank is already held or committed")]
    SlotConflict,

    #[error("Reservation hold has expired")]
    HoldExpired,

    #[error("Reservation token does not match the order's purpose or buyer")]
    ReservationMismatch,

    #[error("Payment callback signature rejected")]
    SignatureMismatch,

    #[error("Payment captured but resource commit failed; order {0} queued for reconciliation")]
    ReconciliationRequired(String),

    #[error("Invalid order state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
}

impl PaymentError {
    /// Error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            PaymentError::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            PaymentError::SlotConflict => "CONFLICT",
            PaymentError::HoldExpired => "HOLD_EXPIRED",
            PaymentError::ReservationMismatch => "RESERVATION_MISMATCH",
            PaymentError::SignatureMismatch => "SIGNATURE_REJECTED",
            PaymentError::ReconciliationRequired(_) => "RECONCILIATION_REQUIRED",
            PaymentError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            PaymentError::GatewayUnavailable(_) => "GATEWAY_UNAVAILABLE",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            PaymentError::OrderNotFound(_) => 404,
            PaymentError::AmountMismatch { .. }
            | PaymentError::ReservationMismatch
            | PaymentError::SignatureMismatch => 400,
            PaymentError::SlotConflict => 409,
            PaymentError::HoldExpired => 410,
            PaymentError::ReconciliationRequired(_) | PaymentError::InvalidStateTransition(_) => {
                500
            }
            PaymentError::GatewayUnavailable(_) => 503,
        }
    }
}

impl From<SlotError> for PaymentError {
    fn from(e: SlotError) -> Self {
        match e {
            SlotError::RankTaken | SlotError::ScopeOccupied => PaymentError::SlotConflict,
            SlotError::Expired => PaymentError::HoldExpired,
        }
    }
}
