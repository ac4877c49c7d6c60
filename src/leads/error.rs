//! Lead error types

use thiserror::Error;

/// Lead acceptance and lifecycle errors
///
/// `AlreadyAccepted` must read as "someone else got there first", distinct
/// from `NotEntitled`, so the client can route to "next lead" versus
/// "upgrade your plan".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeadError {
    #[error("Lead not found: {0}")]
    NotFound(String),

    #[error("Active lead plan required")]
    NotEntitled,

    #[error("Another freelancer already accepted this lead")]
    AlreadyAccepted,

    #[error("Lead has expired")]
    Expired,

    #[error("Lead was withdrawn by the customer")]
    Withdrawn,

    #[error("Only the posting customer may withdraw a lead")]
    Forbidden,
}

impl LeadError {
    /// Error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LeadError::NotFound(_) => "LEAD_NOT_FOUND",
            LeadError::NotEntitled => "NOT_ENTITLED",
            LeadError::AlreadyAccepted => "ALREADY_ACCEPTED",
            LeadError::Expired => "LEAD_EXPIRED",
            LeadError::Withdrawn => "LEAD_WITHDRAWN",
            LeadError::Forbidden => "FORBIDDEN",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LeadError::NotFound(_) => 404,
            LeadError::NotEntitled | LeadError::Forbidden => 403,
            LeadError::AlreadyAccepted => 409,
            LeadError::Expired | LeadError::Withdrawn => 410,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LeadError::NotEntitled.code(), "NOT_ENTITLED");
        assert_eq!(LeadError::AlreadyAccepted.code(), "ALREADY_ACCEPTED");
        assert_eq!(LeadError::Expired.code(), "LEAD_EXPIRED");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(LeadError::NotEntitled.http_status(), 403);
        assert_eq!(LeadError::AlreadyAccepted.http_status(), 409);
        assert_eq!(LeadError::Expired.http_status(), 410);
        assert_eq!(LeadError::NotFound("x".into()).http_status(), 404);
    }
}
