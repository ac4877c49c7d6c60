//! Slot registry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use utoipa::ToSchema;

use crate::core_types::{Area, CategoryId, FreelancerId, Rank};

/// Key for one (category, area) allocation scope.
///
/// All three ranks of a scope live under one map entry, so the entry lock
/// serializes every mutation within the scope. That single lock is what makes
/// "rank is vacant" and "freelancer holds nothing else here" one atomic check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    pub category: CategoryId,
    pub area: Area,
}

impl ScopeKey {
    pub fn new(category: CategoryId, area: &str) -> Self {
        Self {
            category,
            area: crate::core_types::normalize_area(area),
        }
    }
}

/// Time-boxed, non-durable claim on a rank pending payment confirmation.
///
/// The token is a capability: it carries its own scope so the holder can
/// commit or release without a secondary lookup, and the ulid nonce prevents
/// a stale caller from acting on a re-issued hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReservationToken {
    /// Unique hold id
    #[schema(value_type = String)]
    pub id: Ulid,
    pub category: CategoryId,
    pub area: Area,
    pub rank: Rank,
    pub freelancer: FreelancerId,
    /// Hold auto-reverts to vacant after this instant
    pub hold_expires_at: DateTime<Utc>,
}

impl ReservationToken {
    pub fn scope(&self) -> ScopeKey {
        ScopeKey::new(self.category, &self.area)
    }
}

/// A durably committed position slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PositionSlot {
    pub category: CategoryId,
    pub area: Area,
    pub rank: Rank,
    pub holder: FreelancerId,
    /// Vacates lazily once the backing entitlement ends
    pub expires_at: DateTime<Utc>,
}

/// Result of an availability read. Pure snapshot, no side effects.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Availability {
    pub category: CategoryId,
    pub area: Area,
    /// Ranks with an active hold or committed slot
    pub taken_ranks: Vec<Rank>,
    /// The querying freelancer's own active rank in this scope, if any
    pub current_rank: Option<Rank>,
}

/// Internal per-rank occupancy state.
#[derive(Debug, Clone)]
pub(crate) enum Occupancy {
    /// Reserved, payment pending
    Held {
        token_id: Ulid,
        holder: FreelancerId,
        hold_expires_at: DateTime<Utc>,
    },
    /// Paid for, entitlement-backed
    Committed {
        token_id: Ulid,
        holder: FreelancerId,
        slot_expires_at: DateTime<Utc>,
    },
}

impl Occupancy {
    /// Expired entries count as vacant even before physical removal.
    pub(crate) fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self {
            Occupancy::Held {
                hold_expires_at, ..
            } => now < *hold_expires_at,
            Occupancy::Committed {
                slot_expires_at, ..
            } => now < *slot_expires_at,
        }
    }

    pub(crate) fn holder(&self) -> FreelancerId {
        match self {
            Occupancy::Held { holder, .. } | Occupancy::Committed { holder, .. } => *holder,
        }
    }

    pub(crate) fn token_id(&self) -> Ulid {
        match self {
            Occupancy::Held { token_id, .. } | Occupancy::Committed { token_id, .. } => *token_id,
        }
    }
}
