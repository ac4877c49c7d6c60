//! Request DTOs for the REST surface
//!
//! Deserialization-level shape checks live here; business validation stays
//! in the owning component.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::core_types::{CategoryId, Rank};
use crate::gateway::types::response::ApiError;
use crate::leads::{BudgetRange, CustomerContact};
use crate::payments::Purpose;
use crate::slots::ReservationToken;

/// POST /positions/reserve
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReserveRequest {
    pub category: CategoryId,
    pub area: String,
    /// Rank 1..=3
    pub rank: u8,
}

impl ReserveRequest {
    pub fn rank(&self) -> Result<Rank, ApiError> {
        Rank::try_from(self.rank).map_err(ApiError::bad_request)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.area.trim().is_empty() {
            return Err(ApiError::bad_request("area must not be empty"));
        }
        Ok(())
    }
}

/// POST /payments/create-order
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub purpose: Purpose,
    /// Client-echoed amount in paise; cross-checked server-side
    pub amount_paise: Option<i64>,
    /// Hold placed via POST /positions/reserve, if the UI reserved first
    pub reservation_token: Option<ReservationToken>,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Purpose::Position { area, .. } = &self.purpose
            && area.trim().is_empty()
        {
            return Err(ApiError::bad_request("area must not be empty"));
        }
        Ok(())
    }
}

/// POST /leads
#[derive(Debug, Deserialize, ToSchema)]
pub struct PostLeadRequest {
    pub contact: CustomerContact,
    pub category: CategoryId,
    pub area: String,
    pub budget: BudgetRange,
}

impl PostLeadRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.area.trim().is_empty() {
            return Err(ApiError::bad_request("area must not be empty"));
        }
        if self.contact.name.trim().is_empty() || self.contact.phone.trim().is_empty() {
            return Err(ApiError::bad_request("contact name and phone are required"));
        }
        if self.budget.min_paise < 0 || self.budget.max_paise < self.budget.min_paise {
            return Err(ApiError::bad_request("budget range is inverted"));
        }
        Ok(())
    }
}

/// POST /freelancers/scopes
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterScopeRequest {
    pub category: CategoryId,
    pub area: String,
}

impl RegisterScopeRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.area.trim().is_empty() {
            return Err(ApiError::bad_request("area must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_request_rank_bounds() {
        let req = ReserveRequest {
            category: 7,
            area: "koramangala".into(),
            rank: 3,
        };
        assert_eq!(req.rank().unwrap(), Rank::Third);

        let bad = ReserveRequest {
            category: 7,
            area: "koramangala".into(),
            rank: 4,
        };
        assert!(bad.rank().is_err());
    }

    #[test]
    fn test_post_lead_budget_validation() {
        let mut req = PostLeadRequest {
            contact: CustomerContact {
                name: "Asha".into(),
                phone: "+91-98".into(),
            },
            category: 7,
            area: "koramangala".into(),
            budget: BudgetRange {
                min_paise: 100,
                max_paise: 50,
            },
        };
        assert!(req.validate().is_err());
        req.budget.max_paise = 200;
        assert!(req.validate().is_ok());
    }
}
