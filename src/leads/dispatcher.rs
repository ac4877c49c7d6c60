//! Lead dispatcher
//!
//! Owns Lead creation and expiry. Acceptance is arbitrated separately by
//! [`AcceptanceCoordinator`](super::acceptance::AcceptanceCoordinator),
//! which mutates leads through the same per-lead entry lock used here.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use tracing::{debug, info};

use crate::core_types::{CustomerId, normalize_area};
use crate::directory::FreelancerDirectory;
use crate::notify::NotificationTransport;

use super::error::LeadError;
use super::types::{Lead, LeadId, LeadStatus, PostLead};

pub struct LeadDispatcher {
    leads: DashMap<LeadId, Lead>,
    directory: Arc<FreelancerDirectory>,
    transport: Arc<dyn NotificationTransport>,
    ttl: Duration,
}

impl LeadDispatcher {
    pub fn new(
        directory: Arc<FreelancerDirectory>,
        transport: Arc<dyn NotificationTransport>,
        ttl: Duration,
    ) -> Self {
        Self {
            leads: DashMap::new(),
            directory,
            transport,
            ttl,
        }
    }

    /// Create a lead and fan it out to every eligible freelancer.
    ///
    /// Dispatch is fire-and-forget per freelancer: the lead stays `open`
    /// whether or not any notification lands.
    pub async fn post_lead(&self, req: PostLead) -> LeadId {
        self.post_lead_at(req, Utc::now()).await
    }

    pub async fn post_lead_at(&self, req: PostLead, now: DateTime<Utc>) -> LeadId {
        let area = normalize_area(&req.area);
        let lead = Lead {
            id: LeadId::new(),
            customer: req.customer,
            contact: req.contact,
            category: req.category,
            area: area.clone(),
            budget: req.budget,
            status: LeadStatus::Open,
            accepted_by: None,
            created_at: now,
            expires_at: now + self.ttl,
        };
        let id = lead.id;
        let summary = lead.summary();
        self.leads.insert(id, lead);

        let eligible = self.directory.eligible_for(req.category, &area);
        info!(
            lead_id = %id,
            category = req.category,
            area = %area,
            eligible = eligible.len(),
            "Lead posted"
        );

        join_all(
            eligible
                .iter()
                .map(|&freelancer| self.transport.dispatch(freelancer, &summary)),
        )
        .await;

        id
    }

    /// TTL sweep: open leads past their deadline become expired.
    ///
    /// Idempotent and safe against concurrent accepts - both sides mutate
    /// under the per-lead entry lock.
    pub fn expire_stale(&self, now: DateTime<Utc>) -> usize {
        let mut expired = 0;
        for mut lead in self.leads.iter_mut() {
            if lead.status == LeadStatus::Open && now >= lead.expires_at {
                lead.status = LeadStatus::Expired;
                expired += 1;
                debug!(lead_id = %lead.id, "Lead expired");
            }
        }
        expired
    }

    /// Customer retracts an open lead.
    pub fn withdraw(&self, lead_id: LeadId, customer: CustomerId) -> Result<(), LeadError> {
        let mut lead = self
            .leads
            .get_mut(&lead_id)
            .ok_or_else(|| LeadError::NotFound(lead_id.to_string()))?;

        if lead.customer != customer {
            return Err(LeadError::Forbidden);
        }
        match lead.status {
            LeadStatus::Open => {
                lead.status = LeadStatus::Withdrawn;
                info!(lead_id = %lead_id, "Lead withdrawn");
                Ok(())
            }
            LeadStatus::Accepted => Err(LeadError::AlreadyAccepted),
            LeadStatus::Expired => Err(LeadError::Expired),
            LeadStatus::Withdrawn => Ok(()), // already done
        }
    }

    /// Status read.
    pub fn get(&self, lead_id: LeadId) -> Option<Lead> {
        self.leads.get(&lead_id).map(|l| l.clone())
    }

    /// Per-lead map, shared with the acceptance coordinator so that expiry
    /// and acceptance serialize on the same entry lock.
    pub(crate) fn leads(&self) -> &DashMap<LeadId, Lead> {
        &self.leads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::types::{BudgetRange, CustomerContact};
    use crate::notify::RecordingTransport;

    fn post(customer: CustomerId) -> PostLead {
        PostLead {
            customer,
            contact: CustomerContact {
                name: "Asha".to_string(),
                phone: "+91-9800000001".to_string(),
            },
            category: 7,
            area: "Koramangala".to_string(),
            budget: BudgetRange {
                min_paise: 500_00,
                max_paise: 2_000_00,
            },
        }
    }

    fn dispatcher() -> (Arc<RecordingTransport>, LeadDispatcher) {
        let directory = Arc::new(FreelancerDirectory::new());
        directory.register(1001, 7, "koramangala");
        directory.register(1002, 7, "koramangala");
        directory.register(1003, 8, "koramangala"); // other category

        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = LeadDispatcher::new(
            directory,
            Arc::clone(&transport) as Arc<dyn NotificationTransport>,
            Duration::hours(24),
        );
        (transport, dispatcher)
    }

    #[tokio::test]
    async fn test_post_lead_dispatches_to_eligible_only() {
        let (transport, dispatcher) = dispatcher();

        let id = dispatcher.post_lead(post(500)).await;

        let sent = transport.sent();
        let recipients: Vec<_> = sent.iter().map(|(f, _)| *f).collect();
        assert_eq!(recipients, vec![1001, 1002]);
        // Summaries never leak contact details (type-level: LeadSummary has
        // no contact field), and reference the right lead
        assert!(sent.iter().all(|(_, s)| s.lead_id == id));

        let lead = dispatcher.get(id).unwrap();
        assert_eq!(lead.status, LeadStatus::Open);
    }

    #[tokio::test]
    async fn test_expire_stale_is_idempotent() {
        let (_, dispatcher) = dispatcher();
        let now = Utc::now();

        let id = dispatcher.post_lead_at(post(500), now).await;

        assert_eq!(dispatcher.expire_stale(now + Duration::hours(23)), 0);
        assert_eq!(dispatcher.expire_stale(now + Duration::hours(24)), 1);
        assert_eq!(dispatcher.expire_stale(now + Duration::hours(25)), 0);

        assert_eq!(dispatcher.get(id).unwrap().status, LeadStatus::Expired);
    }

    #[tokio::test]
    async fn test_withdraw_requires_posting_customer() {
        let (_, dispatcher) = dispatcher();

        let id = dispatcher.post_lead(post(500)).await;

        assert_eq!(dispatcher.withdraw(id, 999), Err(LeadError::Forbidden));
        assert_eq!(dispatcher.withdraw(id, 500), Ok(()));
        assert_eq!(dispatcher.withdraw(id, 500), Ok(())); // idempotent
        assert_eq!(dispatcher.get(id).unwrap().status, LeadStatus::Withdrawn);
    }
}
