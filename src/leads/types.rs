//! Lead types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use utoipa::ToSchema;

use crate::core_types::{Area, CategoryId, CustomerId, FreelancerId};

/// Lead ID. Sortable, generated without coordination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[schema(value_type = String)]
pub struct LeadId(pub Ulid);

impl LeadId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for LeadId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LeadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LeadId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

/// Lead lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Accepting the race
    Open,
    /// Won; `accepted_by` is set and immutable
    Accepted,
    /// TTL passed without a winner
    Expired,
    /// Retracted by the posting customer
    Withdrawn,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::Open => "open",
            LeadStatus::Accepted => "accepted",
            LeadStatus::Expired => "expired",
            LeadStatus::Withdrawn => "withdrawn",
        }
    }
}

/// Customer budget expectations, in paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BudgetRange {
    pub min_paise: i64,
    pub max_paise: i64,
}

/// Contact details released only to the accept winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomerContact {
    pub name: String,
    pub phone: String,
}

/// A customer-posted job requirement.
#[derive(Debug, Clone)]
pub struct Lead {
    pub id: LeadId,
    pub customer: CustomerId,
    /// Withheld from dispatch summaries; released on acceptance
    pub contact: CustomerContact,
    pub category: CategoryId,
    pub area: Area,
    pub budget: BudgetRange,
    pub status: LeadStatus,
    pub accepted_by: Option<FreelancerId>,
    pub created_at: DateTime<Utc>,
    /// TTL deadline fixed at creation
    pub expires_at: DateTime<Utc>,
}

/// Input for posting a lead.
#[derive(Debug, Clone)]
pub struct PostLead {
    pub customer: CustomerId,
    pub contact: CustomerContact,
    pub category: CategoryId,
    pub area: Area,
    pub budget: BudgetRange,
}

/// What eligible freelancers see in the dispatch notification.
///
/// Deliberately excludes the customer contact: that is the prize of the
/// acceptance race, not part of the broadcast.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeadSummary {
    #[schema(value_type = String)]
    pub lead_id: LeadId,
    pub category: CategoryId,
    pub area: Area,
    pub budget: BudgetRange,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn summary(&self) -> LeadSummary {
        LeadSummary {
            lead_id: self.id,
            category: self.category,
            area: self.area.clone(),
            budget: self.budget,
            created_at: self.created_at,
        }
    }
}
