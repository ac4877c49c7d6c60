//! Entitlement types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{Area, CategoryId, FreelancerId, Rank};

/// Subscription plan families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Unlocks accepting customer leads. Not rank-scoped.
    Lead,
    /// One purchased rank in one (category, area).
    Position,
    /// Profile badge. Cosmetic entitlement, no gating role.
    Badge,
}

impl PlanType {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanType::Lead => "lead",
            PlanType::Position => "position",
            PlanType::Badge => "badge",
        }
    }
}

/// Badge flavors a freelancer can purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    Verified,
    TopRated,
}

/// The (category, area, rank) a position entitlement is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PositionScope {
    pub category: CategoryId,
    pub area: Area,
    pub rank: Rank,
}

/// An active subscription right with an expiry.
///
/// Never mutated in place: renewal supersedes with a fresh entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionEntitlement {
    pub freelancer: FreelancerId,
    pub plan: PlanType,
    /// Set iff `plan == Badge`
    pub badge: Option<BadgeKind>,
    /// Set iff `plan == Position`
    pub position: Option<PositionScope>,
    pub end_date: DateTime<Utc>,
}

impl SubscriptionEntitlement {
    pub fn lead_plan(freelancer: FreelancerId, end_date: DateTime<Utc>) -> Self {
        Self {
            freelancer,
            plan: PlanType::Lead,
            badge: None,
            position: None,
            end_date,
        }
    }

    pub fn position(
        freelancer: FreelancerId,
        scope: PositionScope,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            freelancer,
            plan: PlanType::Position,
            badge: None,
            position: Some(scope),
            end_date,
        }
    }

    pub fn badge(freelancer: FreelancerId, kind: BadgeKind, end_date: DateTime<Utc>) -> Self {
        Self {
            freelancer,
            plan: PlanType::Badge,
            badge: Some(kind),
            position: None,
            end_date,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.end_date
    }

    /// Supersede key: two entitlements with the same key extend rather than
    /// stack. Position plans collapse on (category, area) - the rank may
    /// change across renewals, the scope may not double-book.
    pub(crate) fn supersede_key(&self) -> (PlanType, Option<(CategoryId, Area)>) {
        let scope = self
            .position
            .as_ref()
            .map(|p| (p.category, p.area.clone()));
        (self.plan, scope)
    }
}
