//! Acceptance coordinator
//!
//! Arbitrates concurrent accept attempts on one lead. The open→accepted
//! transition is a single check-and-set under the lead's entry lock: the
//! first caller to observe `open` wins, everyone else observes the result.
//! There is no hold phase - lead acceptance has no external payment step,
//! so entitlement is checked up front rather than reserved.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::core_types::FreelancerId;
use crate::subscriptions::{PlanType, SubscriptionLedger};

use super::dispatcher::LeadDispatcher;
use super::error::LeadError;
use super::types::{CustomerContact, LeadId, LeadStatus};

pub struct AcceptanceCoordinator {
    dispatcher: Arc<LeadDispatcher>,
    ledger: Arc<SubscriptionLedger>,
}

impl AcceptanceCoordinator {
    pub fn new(dispatcher: Arc<LeadDispatcher>, ledger: Arc<SubscriptionLedger>) -> Self {
        Self { dispatcher, ledger }
    }

    /// Attempt to win a lead. At most one caller ever succeeds.
    ///
    /// The entitlement gate runs before the lead is touched: an unentitled
    /// freelancer cannot consume the open state, and the lead stays
    /// winnable for everyone else.
    pub fn accept(
        &self,
        lead_id: LeadId,
        freelancer: FreelancerId,
    ) -> Result<CustomerContact, LeadError> {
        self.accept_at(lead_id, freelancer, Utc::now())
    }

    pub fn accept_at(
        &self,
        lead_id: LeadId,
        freelancer: FreelancerId,
        now: DateTime<Utc>,
    ) -> Result<CustomerContact, LeadError> {
        if !self
            .ledger
            .is_entitled_at(freelancer, PlanType::Lead, None, now)
        {
            debug!(
                lead_id = %lead_id,
                freelancer = freelancer,
                "Accept rejected: no active lead plan"
            );
            return Err(LeadError::NotEntitled);
        }

        // Entry lock held for the whole check-and-set
        let mut lead = self
            .dispatcher
            .leads()
            .get_mut(&lead_id)
            .ok_or_else(|| LeadError::NotFound(lead_id.to_string()))?;

        match lead.status {
            LeadStatus::Open => {
                if now >= lead.expires_at {
                    // Lazy expiry: the sweep has not run yet but the TTL is
                    // authoritative either way
                    lead.status = LeadStatus::Expired;
                    return Err(LeadError::Expired);
                }
                lead.status = LeadStatus::Accepted;
                lead.accepted_by = Some(freelancer);
                info!(
                    lead_id = %lead_id,
                    freelancer = freelancer,
                    "Lead accepted, contact released"
                );
                Ok(lead.contact.clone())
            }
            LeadStatus::Accepted => Err(LeadError::AlreadyAccepted),
            LeadStatus::Expired => Err(LeadError::Expired),
            LeadStatus::Withdrawn => Err(LeadError::Withdrawn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::FreelancerDirectory;
    use crate::leads::types::{BudgetRange, CustomerContact, PostLead};
    use crate::notify::RecordingTransport;
    use crate::subscriptions::SubscriptionEntitlement;
    use chrono::Duration;
    use std::thread;

    const F_ENTITLED_A: FreelancerId = 1001;
    const F_ENTITLED_B: FreelancerId = 1002;
    const F_UNENTITLED: FreelancerId = 1003;

    fn setup() -> (Arc<LeadDispatcher>, Arc<SubscriptionLedger>, AcceptanceCoordinator) {
        let directory = Arc::new(FreelancerDirectory::new());
        let dispatcher = Arc::new(LeadDispatcher::new(
            directory,
            Arc::new(RecordingTransport::new()),
            Duration::hours(24),
        ));
        let ledger = Arc::new(SubscriptionLedger::new());
        let coordinator = AcceptanceCoordinator::new(Arc::clone(&dispatcher), Arc::clone(&ledger));
        (dispatcher, ledger, coordinator)
    }

    fn post() -> PostLead {
        PostLead {
            customer: 500,
            contact: CustomerContact {
                name: "Asha".to_string(),
                phone: "+91-9800000001".to_string(),
            },
            category: 7,
            area: "koramangala".to_string(),
            budget: BudgetRange {
                min_paise: 500_00,
                max_paise: 2_000_00,
            },
        }
    }

    #[tokio::test]
    async fn test_first_accept_wins_second_rejected() {
        let (dispatcher, ledger, coordinator) = setup();
        let now = Utc::now();
        let end = now + Duration::days(30);
        ledger.grant(SubscriptionEntitlement::lead_plan(F_ENTITLED_A, end));
        ledger.grant(SubscriptionEntitlement::lead_plan(F_ENTITLED_B, end));

        let lead_id = dispatcher.post_lead_at(post(), now).await;

        let contact = coordinator.accept_at(lead_id, F_ENTITLED_A, now).unwrap();
        assert_eq!(contact.phone, "+91-9800000001");

        assert_eq!(
            coordinator.accept_at(lead_id, F_ENTITLED_B, now),
            Err(LeadError::AlreadyAccepted)
        );
        // Winner is immutable
        assert_eq!(dispatcher.get(lead_id).unwrap().accepted_by, Some(F_ENTITLED_A));
    }

    #[tokio::test]
    async fn test_unentitled_accept_leaves_lead_open() {
        let (dispatcher, ledger, coordinator) = setup();
        let now = Utc::now();
        ledger.grant(SubscriptionEntitlement::lead_plan(
            F_ENTITLED_A,
            now + Duration::days(30),
        ));

        let lead_id = dispatcher.post_lead_at(post(), now).await;

        // F_UNENTITLED races first but cannot legally win
        assert_eq!(
            coordinator.accept_at(lead_id, F_UNENTITLED, now),
            Err(LeadError::NotEntitled)
        );
        assert_eq!(dispatcher.get(lead_id).unwrap().status, LeadStatus::Open);

        // The entitled freelancer still wins afterwards
        assert!(coordinator.accept_at(lead_id, F_ENTITLED_A, now).is_ok());
    }

    #[tokio::test]
    async fn test_lapsed_plan_is_not_entitled() {
        let (dispatcher, ledger, coordinator) = setup();
        let now = Utc::now();
        ledger.grant(SubscriptionEntitlement::lead_plan(
            F_ENTITLED_A,
            now - Duration::days(1), // lapsed yesterday
        ));

        let lead_id = dispatcher.post_lead_at(post(), now).await;
        assert_eq!(
            coordinator.accept_at(lead_id, F_ENTITLED_A, now),
            Err(LeadError::NotEntitled)
        );
    }

    #[tokio::test]
    async fn test_accept_after_ttl_expires_lazily() {
        let (dispatcher, ledger, coordinator) = setup();
        let now = Utc::now();
        ledger.grant(SubscriptionEntitlement::lead_plan(
            F_ENTITLED_A,
            now + Duration::days(30),
        ));

        let lead_id = dispatcher.post_lead_at(post(), now).await;

        // TTL passed; the sweep has not run, acceptance still refuses
        let late = now + Duration::hours(25);
        assert_eq!(
            coordinator.accept_at(lead_id, F_ENTITLED_A, late),
            Err(LeadError::Expired)
        );
        assert_eq!(dispatcher.get(lead_id).unwrap().status, LeadStatus::Expired);
    }

    #[tokio::test]
    async fn test_accept_withdrawn_lead() {
        let (dispatcher, ledger, coordinator) = setup();
        let now = Utc::now();
        ledger.grant(SubscriptionEntitlement::lead_plan(
            F_ENTITLED_A,
            now + Duration::days(30),
        ));

        let lead_id = dispatcher.post_lead_at(post(), now).await;
        dispatcher.withdraw(lead_id, 500).unwrap();

        assert_eq!(
            coordinator.accept_at(lead_id, F_ENTITLED_A, now),
            Err(LeadError::Withdrawn)
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_accepts_single_winner() {
        let (dispatcher, ledger, coordinator) = setup();
        let now = Utc::now();
        let end = now + Duration::days(30);
        for freelancer in 1..=16u64 {
            ledger.grant(SubscriptionEntitlement::lead_plan(freelancer, end));
        }

        let lead_id = dispatcher.post_lead_at(post(), now).await;
        let coordinator = Arc::new(coordinator);

        let mut handles = vec![];
        for freelancer in 1..=16u64 {
            let coordinator = Arc::clone(&coordinator);
            handles.push(thread::spawn(move || {
                coordinator.accept_at(lead_id, freelancer, now)
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one concurrent accept may win");
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| *e == LeadError::AlreadyAccepted)
        );
    }
}
