//! Background sweeper
//!
//! Periodically expires stale leads and payment holds, purges lapsed slot
//! entries, and releases committed slots whose backing entitlement ended.
//! Correctness never depends on the sweep running: every read path treats
//! lapsed state as vacant already.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::leads::LeadDispatcher;
use crate::payments::PaymentOrchestrator;
use crate::slots::SlotRegistry;
use crate::subscriptions::SubscriptionLedger;

/// Configuration for the sweeper
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to run a sweep pass
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

/// Counts from one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub leads_expired: usize,
    pub orders_expired: usize,
    pub slots_released: usize,
    pub slots_purged: usize,
    pub entitlements_pruned: usize,
}

pub struct Sweeper {
    slots: Arc<SlotRegistry>,
    ledger: Arc<SubscriptionLedger>,
    payments: Arc<PaymentOrchestrator>,
    dispatcher: Arc<LeadDispatcher>,
    config: SweeperConfig,
}

impl Sweeper {
    pub fn new(
        slots: Arc<SlotRegistry>,
        ledger: Arc<SubscriptionLedger>,
        payments: Arc<PaymentOrchestrator>,
        dispatcher: Arc<LeadDispatcher>,
        config: SweeperConfig,
    ) -> Self {
        Self {
            slots,
            ledger,
            payments,
            dispatcher,
            config,
        }
    }

    /// Run the sweep loop forever.
    pub async fn run(&self) -> ! {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "Starting sweeper"
        );
        loop {
            tokio::time::sleep(self.config.interval).await;
            let stats = self.pass(Utc::now());
            if stats != SweepStats::default() {
                info!(
                    leads_expired = stats.leads_expired,
                    orders_expired = stats.orders_expired,
                    slots_released = stats.slots_released,
                    slots_purged = stats.slots_purged,
                    entitlements_pruned = stats.entitlements_pruned,
                    "Sweep pass finished"
                );
            } else {
                debug!("Sweep pass found nothing to do");
            }
        }
    }

    /// One sweep pass. Idempotent; safe to call concurrently with live
    /// traffic - every mutation goes through the same per-key locks the
    /// request paths use.
    pub fn pass(&self, now: DateTime<Utc>) -> SweepStats {
        let leads_expired = self.dispatcher.expire_stale(now);
        let orders_expired = self.payments.expire_stale(now);

        // Committed slots whose backing entitlement lapsed get vacated,
        // then the lapsed rows themselves are pruned.
        let mut slots_released = 0;
        for (freelancer, scope) in self.ledger.lapsed_position_scopes(now) {
            if self
                .slots
                .release_slot(scope.category, &scope.area, scope.rank, freelancer)
            {
                slots_released += 1;
            }
        }
        let entitlements_pruned = self.ledger.prune_expired(now);
        let slots_purged = self.slots.purge_expired(now);

        SweepStats {
            leads_expired,
            orders_expired,
            slots_released,
            slots_purged,
            entitlements_pruned,
        }
    }
}
