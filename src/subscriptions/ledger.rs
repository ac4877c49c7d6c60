//! Subscription ledger implementation
//!
//! Writes are append/supersede and commutative; the ledger tolerates being
//! briefly behind the slot registry after a payment commit without
//! correctness loss. The registry stays the source of truth for occupancy.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::core_types::{CategoryId, FreelancerId};

use super::types::{PlanType, PositionScope, SubscriptionEntitlement};

/// Per-freelancer entitlement store.
pub struct SubscriptionLedger {
    entitlements: DashMap<FreelancerId, Vec<SubscriptionEntitlement>>,
}

impl SubscriptionLedger {
    pub fn new() -> Self {
        Self {
            entitlements: DashMap::new(),
        }
    }

    /// True iff an entitlement of the plan type (and, for position plans,
    /// the given scope) is active. Never errors.
    pub fn is_entitled(
        &self,
        freelancer: FreelancerId,
        plan: PlanType,
        scope: Option<(CategoryId, &str)>,
    ) -> bool {
        self.is_entitled_at(freelancer, plan, scope, Utc::now())
    }

    pub fn is_entitled_at(
        &self,
        freelancer: FreelancerId,
        plan: PlanType,
        scope: Option<(CategoryId, &str)>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(rows) = self.entitlements.get(&freelancer) else {
            return false;
        };
        rows.iter().any(|e| {
            e.plan == plan
                && e.is_active(now)
                && match (plan, scope) {
                    (PlanType::Position, Some((category, area))) => e
                        .position
                        .as_ref()
                        .is_some_and(|p| p.category == category && p.area == area),
                    (PlanType::Position, None) => true,
                    _ => true,
                }
        })
    }

    /// Idempotent insert. An active entitlement with the same supersede key
    /// is replaced, keeping the later end date - renewal extends, it never
    /// stacks a second concurrent right.
    pub fn grant(&self, entitlement: SubscriptionEntitlement) {
        let key = entitlement.supersede_key();
        let mut rows = self.entitlements.entry(entitlement.freelancer).or_default();

        let mut end_date = entitlement.end_date;
        if let Some(existing) = rows.iter().position(|e| e.supersede_key() == key) {
            let old = rows.remove(existing);
            end_date = end_date.max(old.end_date);
            debug!(
                freelancer = entitlement.freelancer,
                plan = entitlement.plan.as_str(),
                "Superseding existing entitlement"
            );
        }

        let mut granted = entitlement;
        granted.end_date = end_date;
        info!(
            freelancer = granted.freelancer,
            plan = granted.plan.as_str(),
            end_date = %granted.end_date,
            "Entitlement granted"
        );
        rows.push(granted);
    }

    /// Remove an entitlement outright (refund/abuse path).
    pub fn revoke(
        &self,
        freelancer: FreelancerId,
        plan: PlanType,
        scope: Option<(CategoryId, &str)>,
    ) -> bool {
        let Some(mut rows) = self.entitlements.get_mut(&freelancer) else {
            return false;
        };
        let before = rows.len();
        rows.retain(|e| {
            !(e.plan == plan
                && match (plan, scope) {
                    (PlanType::Position, Some((category, area))) => e
                        .position
                        .as_ref()
                        .is_some_and(|p| p.category == category && p.area == area),
                    _ => true,
                })
        });
        before != rows.len()
    }

    /// Position scopes whose backing entitlement has ended. The sweeper
    /// releases the matching committed slots from these.
    pub fn lapsed_position_scopes(
        &self,
        now: DateTime<Utc>,
    ) -> Vec<(FreelancerId, PositionScope)> {
        let mut lapsed = Vec::new();
        for rows in self.entitlements.iter() {
            for e in rows.value() {
                if e.plan == PlanType::Position
                    && !e.is_active(now)
                    && let Some(scope) = &e.position
                {
                    lapsed.push((e.freelancer, scope.clone()));
                }
            }
        }
        lapsed
    }

    /// Drop ended entitlements. Reads never depend on this; it only bounds
    /// memory and keeps `lapsed_position_scopes` from re-reporting.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let mut pruned = 0;
        for mut rows in self.entitlements.iter_mut() {
            let before = rows.len();
            rows.retain(|e| e.is_active(now));
            pruned += before - rows.len();
        }
        self.entitlements.retain(|_, rows| !rows.is_empty());
        pruned
    }

    /// Active end date for a (plan, scope), if any. Used by the payment
    /// orchestrator to extend renewals from the current expiry.
    pub fn active_until(
        &self,
        freelancer: FreelancerId,
        plan: PlanType,
        scope: Option<(CategoryId, &str)>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let rows = self.entitlements.get(&freelancer)?;
        rows.iter()
            .filter(|e| {
                e.plan == plan
                    && e.is_active(now)
                    && match (plan, scope) {
                        (PlanType::Position, Some((category, area))) => e
                            .position
                            .as_ref()
                            .is_some_and(|p| p.category == category && p.area == area),
                        _ => true,
                    }
            })
            .map(|e| e.end_date)
            .max()
    }
}

impl Default for SubscriptionLedger {
    fn default() -> Self {
        Self::new()
    }
}
