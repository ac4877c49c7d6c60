//! Slot registry implementation
//!
//! One `DashMap` entry per (category, area) scope. Every mutating operation
//! runs under that entry's lock, which is the per-key atomic check-and-set
//! the allocation protocol requires: two concurrent reservations for the
//! same vacant rank cannot both observe it vacant.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::core_types::{CategoryId, FreelancerId, Rank};

use super::error::SlotError;
use super::types::{Availability, Occupancy, PositionSlot, ReservationToken, ScopeKey};

/// Authoritative registry of position holds and committed slots.
///
/// The registry is the source of truth for "is this rank taken". The
/// subscription ledger may briefly lag behind a commit; the sweeper
/// reconciles, never this registry.
pub struct SlotRegistry {
    scopes: DashMap<ScopeKey, [Option<Occupancy>; 3]>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self {
            scopes: DashMap::new(),
        }
    }

    /// Snapshot taken ranks for a scope. Pure read; no side effects.
    pub fn availability(
        &self,
        category: CategoryId,
        area: &str,
        freelancer: FreelancerId,
    ) -> Availability {
        self.availability_at(category, area, freelancer, Utc::now())
    }

    pub fn availability_at(
        &self,
        category: CategoryId,
        area: &str,
        freelancer: FreelancerId,
        now: DateTime<Utc>,
    ) -> Availability {
        let key = ScopeKey::new(category, area);
        let mut taken_ranks = Vec::new();
        let mut current_rank = None;

        if let Some(entry) = self.scopes.get(&key) {
            for rank in Rank::ALL {
                if let Some(occ) = &entry[rank.index()]
                    && occ.is_active(now)
                {
                    taken_ranks.push(rank);
                    if occ.holder() == freelancer {
                        current_rank = Some(rank);
                    }
                }
            }
        }

        Availability {
            category,
            area: key.area,
            taken_ranks,
            current_rank,
        }
    }

    /// Place a time-boxed hold on a rank.
    ///
    /// Fails with [`SlotError::RankTaken`] if the rank has an active hold or
    /// committed slot, and with [`SlotError::ScopeOccupied`] if the
    /// freelancer already occupies any rank in the scope. First caller wins;
    /// the loser never queues.
    pub fn reserve(
        &self,
        category: CategoryId,
        area: &str,
        rank: Rank,
        freelancer: FreelancerId,
        hold: Duration,
    ) -> Result<ReservationToken, SlotError> {
        self.reserve_at(category, area, rank, freelancer, hold, Utc::now())
    }

    pub fn reserve_at(
        &self,
        category: CategoryId,
        area: &str,
        rank: Rank,
        freelancer: FreelancerId,
        hold: Duration,
        now: DateTime<Utc>,
    ) -> Result<ReservationToken, SlotError> {
        let key = ScopeKey::new(category, area);
        // Entry lock held for the whole check-and-set
        let mut entry = self.scopes.entry(key.clone()).or_default();

        for other in Rank::ALL {
            if let Some(occ) = &entry[other.index()]
                && occ.is_active(now)
            {
                if occ.holder() == freelancer {
                    return Err(SlotError::ScopeOccupied);
                }
                if other == rank {
                    return Err(SlotError::RankTaken);
                }
            }
        }

        let token = ReservationToken {
            id: Ulid::new(),
            category,
            area: key.area,
            rank,
            freelancer,
            hold_expires_at: now + hold,
        };

        entry[rank.index()] = Some(Occupancy::Held {
            token_id: token.id,
            holder: freelancer,
            hold_expires_at: token.hold_expires_at,
        });

        info!(
            category = category,
            area = %token.area,
            rank = %rank,
            freelancer = freelancer,
            hold_expires_at = %token.hold_expires_at,
            "Rank reserved"
        );

        Ok(token)
    }

    /// Convert a still-valid hold into a committed slot.
    ///
    /// Idempotent: re-committing a token that already produced a slot
    /// returns that slot again. A lapsed or superseded hold fails with
    /// [`SlotError::Expired`]; the caller must re-reserve.
    pub fn commit(
        &self,
        token: &ReservationToken,
        slot_expires_at: DateTime<Utc>,
    ) -> Result<PositionSlot, SlotError> {
        self.commit_at(token, slot_expires_at, Utc::now())
    }

    pub fn commit_at(
        &self,
        token: &ReservationToken,
        slot_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<PositionSlot, SlotError> {
        let key = token.scope();
        let mut entry = self.scopes.entry(key).or_default();
        let idx = token.rank.index();

        let current = entry[idx].clone();
        match current {
            Some(occ) if occ.token_id() == token.id => match occ {
                Occupancy::Committed {
                    slot_expires_at: existing,
                    ..
                } => {
                    // Idempotent re-commit of the same token
                    debug!(token_id = %token.id, "Commit replay, returning existing slot");
                    Ok(PositionSlot {
                        category: token.category,
                        area: token.area.clone(),
                        rank: token.rank,
                        holder: token.freelancer,
                        expires_at: existing,
                    })
                }
                Occupancy::Held {
                    hold_expires_at, ..
                } => {
                    if now >= hold_expires_at {
                        entry[idx] = None;
                        return Err(SlotError::Expired);
                    }
                    entry[idx] = Some(Occupancy::Committed {
                        token_id: token.id,
                        holder: token.freelancer,
                        slot_expires_at,
                    });
                    info!(
                        category = token.category,
                        area = %token.area,
                        rank = %token.rank,
                        freelancer = token.freelancer,
                        expires_at = %slot_expires_at,
                        "Slot committed"
                    );
                    Ok(PositionSlot {
                        category: token.category,
                        area: token.area.clone(),
                        rank: token.rank,
                        holder: token.freelancer,
                        expires_at: slot_expires_at,
                    })
                }
            },
            // Vacant, or re-issued to someone else after the hold lapsed
            _ => Err(SlotError::Expired),
        }
    }

    /// Explicitly vacate a hold (payment failure path).
    ///
    /// Releasing an expired or superseded token is a no-op; returns whether
    /// anything was removed.
    pub fn release(&self, token: &ReservationToken) -> bool {
        let key = token.scope();
        let mut entry = match self.scopes.get_mut(&key) {
            Some(e) => e,
            None => return false,
        };

        let idx = token.rank.index();
        let matches = entry[idx]
            .as_ref()
            .is_some_and(|occ| occ.token_id() == token.id);
        if matches {
            entry[idx] = None;
            debug!(token_id = %token.id, rank = %token.rank, "Hold released");
        }
        matches
    }

    /// Vacate a committed slot (entitlement lapse path).
    pub fn release_slot(
        &self,
        category: CategoryId,
        area: &str,
        rank: Rank,
        holder: FreelancerId,
    ) -> bool {
        let key = ScopeKey::new(category, area);
        let mut entry = match self.scopes.get_mut(&key) {
            Some(e) => e,
            None => return false,
        };

        let matches = matches!(
            &entry[rank.index()],
            Some(Occupancy::Committed { holder: h, .. }) if *h == holder
        );
        if matches {
            entry[rank.index()] = None;
            warn!(
                category = category,
                area = %key.area,
                rank = %rank,
                freelancer = holder,
                "Committed slot released"
            );
        }
        matches
    }

    /// Physically remove lapsed entries. Correctness never depends on this
    /// running; reads already treat expired entries as vacant.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut purged = 0;
        for mut entry in self.scopes.iter_mut() {
            for slot in entry.value_mut().iter_mut() {
                if let Some(occ) = slot
                    && !occ.is_active(now)
                {
                    *slot = None;
                    purged += 1;
                }
            }
        }
        self.scopes
            .retain(|_, slots| slots.iter().any(|s| s.is_some()));
        purged
    }
}

impl Default for SlotRegistry {
    fn default() -> Self {
        Self::new()
    }
}
