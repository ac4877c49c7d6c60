use std::sync::Arc;

use chrono::Duration;

use crate::directory::FreelancerDirectory;
use crate::leads::{AcceptanceCoordinator, LeadDispatcher};
use crate::payments::PaymentOrchestrator;
use crate::slots::SlotRegistry;
use crate::subscriptions::SubscriptionLedger;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    pub slots: Arc<SlotRegistry>,
    pub ledger: Arc<SubscriptionLedger>,
    pub payments: Arc<PaymentOrchestrator>,
    pub dispatcher: Arc<LeadDispatcher>,
    pub acceptance: Arc<AcceptanceCoordinator>,
    pub directory: Arc<FreelancerDirectory>,
    /// Hold duration used by the standalone reserve endpoint
    pub hold: Duration,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        slots: Arc<SlotRegistry>,
        ledger: Arc<SubscriptionLedger>,
        payments: Arc<PaymentOrchestrator>,
        dispatcher: Arc<LeadDispatcher>,
        acceptance: Arc<AcceptanceCoordinator>,
        directory: Arc<FreelancerDirectory>,
        hold: Duration,
    ) -> Self {
        Self {
            slots,
            ledger,
            payments,
            dispatcher,
            acceptance,
            directory,
            hold,
        }
    }
}
