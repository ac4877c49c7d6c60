//! Notification transport boundary
//!
//! Delivery, retry and rendering belong to the external transport; the core
//! only emits one dispatch per eligible freelancer and never waits for a
//! delivery confirmation to keep a lead open.

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

use crate::core_types::FreelancerId;
use crate::leads::types::LeadSummary;

/// External notification transport (push, socket, SMS - not our problem).
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn dispatch(&self, freelancer: FreelancerId, summary: &LeadSummary);
}

/// Default transport: structured log lines, picked up by the delivery tier.
pub struct TracingTransport;

#[async_trait]
impl NotificationTransport for TracingTransport {
    async fn dispatch(&self, freelancer: FreelancerId, summary: &LeadSummary) {
        info!(
            freelancer = freelancer,
            lead_id = %summary.lead_id,
            category = summary.category,
            area = %summary.area,
            "Lead dispatched"
        );
    }
}

/// Records every dispatch. For tests and local runs.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(FreelancerId, LeadSummary)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(FreelancerId, LeadSummary)> {
        self.sent.lock().expect("transport mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn dispatch(&self, freelancer: FreelancerId, summary: &LeadSummary) {
        self.sent
            .lock()
            .expect("transport mutex poisoned")
            .push((freelancer, summary.clone()));
    }
}
