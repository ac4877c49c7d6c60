//! API response types and error codes
//!
//! - `ApiResponse<T>`: unified response wrapper
//! - `ApiError`: typed failure carrying the HTTP status and numeric code
//! - `error_codes`: standard error code constants

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::leads::LeadError;
use crate::payments::PaymentError;
use crate::slots::SlotError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Handler result: success envelope or typed failure.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Create a 200 success response
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

// ============================================================================
// Typed API error
// ============================================================================

/// A failure with its HTTP status and numeric code.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_PARAMETER,
            msg,
        )
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

fn status_of(http: u16) -> StatusCode {
    StatusCode::from_u16(http).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<SlotError> for ApiError {
    fn from(e: SlotError) -> Self {
        let code = match e {
            SlotError::RankTaken | SlotError::ScopeOccupied => error_codes::CONFLICT,
            SlotError::Expired => error_codes::GONE,
        };
        Self::new(status_of(e.http_status()), code, e.to_string())
    }
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        let code = match e {
            PaymentError::OrderNotFound(_) => error_codes::NOT_FOUND,
            PaymentError::AmountMismatch { .. } => error_codes::AMOUNT_MISMATCH,
            PaymentError::ReservationMismatch => error_codes::RESERVATION_MISMATCH,
            PaymentError::SlotConflict => error_codes::CONFLICT,
            PaymentError::HoldExpired => error_codes::GONE,
            PaymentError::SignatureMismatch => error_codes::SIGNATURE_REJECTED,
            PaymentError::ReconciliationRequired(_) => error_codes::RECONCILIATION_REQUIRED,
            PaymentError::InvalidStateTransition(_) => error_codes::INTERNAL_ERROR,
            PaymentError::GatewayUnavailable(_) => error_codes::GATEWAY_UNAVAILABLE,
        };
        Self::new(status_of(e.http_status()), code, e.to_string())
    }
}

impl From<LeadError> for ApiError {
    fn from(e: LeadError) -> Self {
        let code = match e {
            LeadError::NotFound(_) => error_codes::NOT_FOUND,
            LeadError::NotEntitled => error_codes::NOT_ENTITLED,
            LeadError::AlreadyAccepted => error_codes::CONFLICT,
            LeadError::Expired | LeadError::Withdrawn => error_codes::GONE,
            LeadError::Forbidden => error_codes::WRONG_ROLE,
        };
        Self::new(status_of(e.http_status()), code, e.to_string())
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const AMOUNT_MISMATCH: i32 = 1002;
    pub const RESERVATION_MISMATCH: i32 = 1003;

    // Identity errors (2xxx)
    pub const MISSING_IDENTITY: i32 = 2001;
    pub const WRONG_ROLE: i32 = 2002;

    // Entitlement errors (3xxx)
    pub const NOT_ENTITLED: i32 = 3001;

    // Resource errors (4xxx)
    pub const SIGNATURE_REJECTED: i32 = 4003;
    pub const NOT_FOUND: i32 = 4041;
    pub const CONFLICT: i32 = 4090;
    pub const GONE: i32 = 4100;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const RECONCILIATION_REQUIRED: i32 = 5001;
    pub const GATEWAY_UNAVAILABLE: i32 = 5031;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_matches_taxonomy() {
        // Conflict → 409, Expired → 410, NotEntitled → 403,
        // SignatureMismatch → 400, ReconciliationRequired → 500
        assert_eq!(ApiError::from(SlotError::RankTaken).status, StatusCode::CONFLICT);
        assert_eq!(ApiError::from(SlotError::Expired).status, StatusCode::GONE);
        assert_eq!(
            ApiError::from(LeadError::NotEntitled).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(PaymentError::SignatureMismatch).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(PaymentError::ReconciliationRequired("x".into())).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_and_entitlement_codes_differ() {
        // The client routes "someone got there first" and "upgrade your
        // plan" to different flows
        let conflict = ApiError::from(LeadError::AlreadyAccepted);
        let unentitled = ApiError::from(LeadError::NotEntitled);
        assert_ne!(conflict.code, unentitled.code);
    }
}
