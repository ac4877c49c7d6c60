//! Payment Orchestrator
//!
//! Owns PaymentOrder state and is the only writer allowed to touch the slot
//! registry and subscription ledger as a side effect of a verified payment.
//!
//! The per-order `DashMap` entry guard is the per-order mutex: concurrent
//! callbacks for one order serialize on it, so a replayed callback can never
//! double-commit.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::{error, info, warn};

use crate::core_types::{CategoryId, FreelancerId, Rank, normalize_area};
use crate::slots::{ReservationToken, SlotError, SlotRegistry};
use crate::subscriptions::{
    PlanType, PositionScope, SubscriptionEntitlement, SubscriptionLedger,
};

use super::error::PaymentError;
use super::gateway::PaymentGateway;
use super::reconciliation::{ReconciliationQueue, ReconciliationRecord};
use super::signature;
use super::state::OrderState;
use super::types::{
    GatewayCallback, OrderId, OrderReceipt, PaymentOrder, PriceTable, Purpose, paise_to_rupees,
};

/// Tuning and credentials for the orchestrator.
pub struct OrchestratorSettings {
    /// Shared secret for callback signature verification
    pub webhook_secret: Vec<u8>,
    pub currency: String,
    /// How long a rank hold (and an unpaid order) stays alive
    pub hold: Duration,
    /// Validity window of a purchased entitlement
    pub validity: Duration,
    pub prices: PriceTable,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            webhook_secret: b"whsec_dev_only".to_vec(),
            currency: "INR".to_string(),
            hold: Duration::minutes(15),
            validity: Duration::days(30),
            prices: PriceTable::default(),
        }
    }
}

/// A purchase request from an authenticated freelancer.
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub freelancer: FreelancerId,
    pub purpose: Purpose,
    /// Client-echoed amount in paise; cross-checked, never trusted
    pub amount_paise: Option<i64>,
    /// Adopt an existing hold instead of reserving a fresh one
    pub reservation_token: Option<ReservationToken>,
}

pub struct PaymentOrchestrator {
    orders: DashMap<OrderId, PaymentOrder>,
    slots: Arc<SlotRegistry>,
    ledger: Arc<SubscriptionLedger>,
    gateway: Arc<dyn PaymentGateway>,
    settings: OrchestratorSettings,
    reconciliation: ReconciliationQueue,
}

impl PaymentOrchestrator {
    pub fn new(
        slots: Arc<SlotRegistry>,
        ledger: Arc<SubscriptionLedger>,
        gateway: Arc<dyn PaymentGateway>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            orders: DashMap::new(),
            slots,
            ledger,
            gateway,
            settings,
            reconciliation: ReconciliationQueue::new(),
        }
    }

    /// Open a payment order.
    ///
    /// The amount is re-derived from the authoritative price table; for
    /// position purchases the rank hold is attached before the buyer can
    /// reach checkout. A reservation conflict fails the order.
    pub async fn create_order(&self, req: PurchaseRequest) -> Result<OrderReceipt, PaymentError> {
        self.create_order_at(req, Utc::now()).await
    }

    pub async fn create_order_at(
        &self,
        req: PurchaseRequest,
        now: DateTime<Utc>,
    ) -> Result<OrderReceipt, PaymentError> {
        let expected = self.settings.prices.amount_paise(&req.purpose);
        if let Some(claimed) = req.amount_paise
            && claimed != expected
        {
            warn!(
                freelancer = req.freelancer,
                purpose = req.purpose.as_str(),
                claimed_paise = claimed,
                expected_paise = expected,
                "Client amount rejected"
            );
            return Err(PaymentError::AmountMismatch {
                expected_paise: expected,
            });
        }

        let order_id = OrderId::new();

        // External round trip happens before any local state exists, so a
        // gateway failure leaves nothing to clean up.
        let gw = self
            .gateway
            .create_order(expected, &self.settings.currency, &order_id.to_string())
            .await?;

        self.orders.insert(
            order_id,
            PaymentOrder {
                id: order_id,
                freelancer: req.freelancer,
                purpose: req.purpose.clone(),
                amount_paise: expected,
                state: OrderState::Created,
                reservation: None,
                gateway_order_id: gw.gateway_order_id,
                gateway_payment_id: None,
                gateway_signature: None,
                created_at: now,
            },
        );

        // Attach the rank hold (position purchases only)
        let reservation = match &req.purpose {
            Purpose::Position {
                category,
                area,
                rank,
            } => {
                let token = match self.resolve_reservation(&req, *category, area, *rank, now) {
                    Ok(token) => token,
                    Err(e) => {
                        self.fail_order(order_id, &format!("reservation failed: {}", e));
                        return Err(e);
                    }
                };
                Some(token)
            }
            Purpose::LeadPlan | Purpose::Badge { .. } => None,
        };

        let mut order = self
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| PaymentError::OrderNotFound(order_id.to_string()))?;
        order.reservation = reservation;
        Self::transition(&mut order, OrderState::Created, OrderState::Reserved)?;

        info!(
            order_id = %order_id,
            freelancer = req.freelancer,
            purpose = req.purpose.as_str(),
            amount_paise = expected,
            "Payment order opened"
        );

        Ok(self.receipt(&order))
    }

    /// Handle the gateway's asynchronous payment callback.
    ///
    /// Signature first, state effects second: a forged callback is rejected
    /// before it can touch anything, and a genuine one commits the slot
    /// before the ledger grant, in that order.
    pub fn verify(&self, cb: GatewayCallback) -> Result<OrderReceipt, PaymentError> {
        self.verify_at(cb, Utc::now())
    }

    pub fn verify_at(
        &self,
        cb: GatewayCallback,
        now: DateTime<Utc>,
    ) -> Result<OrderReceipt, PaymentError> {
        let mut order = self
            .orders
            .get_mut(&cb.order_id)
            .ok_or_else(|| PaymentError::OrderNotFound(cb.order_id.to_string()))?;

        // Load-bearing check. Runs before any state effect, regardless of
        // what the gateway SDK reported.
        let signature_ok = signature::verify(
            &self.settings.webhook_secret,
            &order.gateway_order_id,
            &cb.gateway_payment_id,
            &cb.signature,
        );
        if !signature_ok {
            error!(
                order_id = %cb.order_id,
                gateway_order_id = %order.gateway_order_id,
                gateway_payment_id = %cb.gateway_payment_id,
                "SECURITY: payment callback signature rejected"
            );
            if order.state == OrderState::Reserved {
                if let Some(token) = order.reservation.clone() {
                    self.slots.release(&token);
                }
                order.state = OrderState::Failed;
            }
            return Err(PaymentError::SignatureMismatch);
        }

        match order.state {
            OrderState::Reserved => { /* the one verifiable state */ }
            OrderState::Verified => {
                // Gateways redeliver callbacks; replaying the same payment
                // id is harmless.
                if order.gateway_payment_id.as_deref() == Some(cb.gateway_payment_id.as_str()) {
                    return Ok(self.receipt(&order));
                }
                return Err(PaymentError::InvalidStateTransition(format!(
                    "order {} already verified by a different payment",
                    order.id
                )));
            }
            OrderState::Expired => {
                // Valid signature on a timed-out order: money captured,
                // resource gone. Operator problem, not a silent drop.
                self.reconciliation.push(ReconciliationRecord {
                    order_id: order.id,
                    freelancer: order.freelancer,
                    purpose: order.purpose.clone(),
                    gateway_payment_id: cb.gateway_payment_id.clone(),
                    reason: "payment captured after order expiry".to_string(),
                    flagged_at: now,
                });
                return Err(PaymentError::ReconciliationRequired(order.id.to_string()));
            }
            state => {
                return Err(PaymentError::InvalidStateTransition(format!(
                    "order {} is {}, cannot verify",
                    order.id, state
                )));
            }
        }

        // Commit the slot first: the registry is the source of truth and a
        // missing ledger row is reconcilable, a double slot is not.
        let end_date = self.entitlement_end(&order.purpose, order.freelancer, now);
        if let Some(token) = order.reservation.clone() {
            match self.slots.commit_at(&token, end_date, now) {
                Ok(_) => {}
                Err(SlotError::Expired) => {
                    order.state = OrderState::Failed;
                    self.reconciliation.push(ReconciliationRecord {
                        order_id: order.id,
                        freelancer: order.freelancer,
                        purpose: order.purpose.clone(),
                        gateway_payment_id: cb.gateway_payment_id.clone(),
                        reason: "hold expired before commit".to_string(),
                        flagged_at: now,
                    });
                    return Err(PaymentError::ReconciliationRequired(order.id.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.ledger.grant(self.entitlement_for(&order, end_date));

        order.gateway_payment_id = Some(cb.gateway_payment_id);
        order.gateway_signature = Some(cb.signature);
        Self::transition(&mut order, OrderState::Reserved, OrderState::Verified)?;

        info!(
            order_id = %order.id,
            freelancer = order.freelancer,
            purpose = order.purpose.as_str(),
            "Payment verified and committed"
        );

        Ok(self.receipt(&order))
    }

    /// Sweep reserved orders whose hold (or creation window) lapsed.
    pub fn expire_stale(&self, now: DateTime<Utc>) -> usize {
        let mut expired = 0;
        for mut order in self.orders.iter_mut() {
            if order.state != OrderState::Reserved {
                continue;
            }
            let deadline = order
                .reservation
                .as_ref()
                .map(|t| t.hold_expires_at)
                .unwrap_or(order.created_at + self.settings.hold);
            if now >= deadline {
                if let Some(token) = order.reservation.clone() {
                    self.slots.release(&token);
                }
                order.state = OrderState::Expired;
                expired += 1;
                info!(order_id = %order.id, "Payment order expired, hold released");
            }
        }
        expired
    }

    /// Status read for the polling client.
    pub fn get(&self, order_id: OrderId) -> Option<PaymentOrder> {
        self.orders.get(&order_id).map(|o| o.clone())
    }

    pub fn reconciliation(&self) -> &ReconciliationQueue {
        &self.reconciliation
    }

    /// Adopt a caller-supplied hold or place a fresh one.
    fn resolve_reservation(
        &self,
        req: &PurchaseRequest,
        category: CategoryId,
        area: &str,
        rank: Rank,
        now: DateTime<Utc>,
    ) -> Result<ReservationToken, PaymentError> {
        if let Some(token) = &req.reservation_token {
            let matches = token.freelancer == req.freelancer
                && token.category == category
                && token.area == normalize_area(area)
                && token.rank == rank;
            if !matches {
                return Err(PaymentError::ReservationMismatch);
            }
            if now >= token.hold_expires_at {
                return Err(PaymentError::HoldExpired);
            }
            return Ok(token.clone());
        }
        self.slots
            .reserve_at(category, area, rank, req.freelancer, self.settings.hold, now)
            .map_err(PaymentError::from)
    }

    /// Renewals of account-scoped plans extend from the current expiry so
    /// paying early never loses time. Position plans always start fresh: a
    /// held scope cannot be re-reserved until it lapses.
    fn entitlement_end(
        &self,
        purpose: &Purpose,
        freelancer: FreelancerId,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        match purpose {
            Purpose::Position { .. } => now + self.settings.validity,
            Purpose::LeadPlan => {
                let base = self
                    .ledger
                    .active_until(freelancer, PlanType::Lead, None, now)
                    .unwrap_or(now)
                    .max(now);
                base + self.settings.validity
            }
            Purpose::Badge { .. } => {
                let base = self
                    .ledger
                    .active_until(freelancer, PlanType::Badge, None, now)
                    .unwrap_or(now)
                    .max(now);
                base + self.settings.validity
            }
        }
    }

    fn entitlement_for(
        &self,
        order: &PaymentOrder,
        end_date: DateTime<Utc>,
    ) -> SubscriptionEntitlement {
        match &order.purpose {
            Purpose::LeadPlan => SubscriptionEntitlement::lead_plan(order.freelancer, end_date),
            Purpose::Badge { badge } => {
                SubscriptionEntitlement::badge(order.freelancer, *badge, end_date)
            }
            Purpose::Position {
                category,
                area,
                rank,
            } => SubscriptionEntitlement::position(
                order.freelancer,
                PositionScope {
                    category: *category,
                    area: normalize_area(area),
                    rank: *rank,
                },
                end_date,
            ),
        }
    }

    fn fail_order(&self, order_id: OrderId, reason: &str) {
        if let Some(mut order) = self.orders.get_mut(&order_id) {
            warn!(order_id = %order_id, reason = reason, "Payment order failed");
            order.state = OrderState::Failed;
        }
    }

    fn transition(
        order: &mut PaymentOrder,
        from: OrderState,
        to: OrderState,
    ) -> Result<(), PaymentError> {
        if order.state != from {
            return Err(PaymentError::InvalidStateTransition(format!(
                "{} -> {} requested but order {} is {}",
                from, to, order.id, order.state
            )));
        }
        order.state = to;
        Ok(())
    }

    fn receipt(&self, order: &PaymentOrder) -> OrderReceipt {
        OrderReceipt {
            order_id: order.id,
            gateway_order_id: order.gateway_order_id.clone(),
            amount_paise: order.amount_paise,
            amount: paise_to_rupees(order.amount_paise),
            currency: self.settings.currency.clone(),
            state: order.state.as_str().to_string(),
            hold_expires_at: order.reservation.as_ref().map(|t| t.hold_expires_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Rank;
    use crate::payments::gateway::MockGateway;

    const SECRET: &[u8] = b"whsec_test";
    const F1: FreelancerId = 1001;
    const F2: FreelancerId = 1002;

    fn position(rank: Rank) -> Purpose {
        Purpose::Position {
            category: 7,
            area: "koramangala".to_string(),
            rank,
        }
    }

    fn orchestrator() -> (Arc<SlotRegistry>, Arc<SubscriptionLedger>, PaymentOrchestrator) {
        let slots = Arc::new(SlotRegistry::new());
        let ledger = Arc::new(SubscriptionLedger::new());
        let settings = OrchestratorSettings {
            webhook_secret: SECRET.to_vec(),
            ..OrchestratorSettings::default()
        };
        let orchestrator = PaymentOrchestrator::new(
            Arc::clone(&slots),
            Arc::clone(&ledger),
            Arc::new(MockGateway::new()),
            settings,
        );
        (slots, ledger, orchestrator)
    }

    fn request(purpose: Purpose) -> PurchaseRequest {
        PurchaseRequest {
            freelancer: F1,
            purpose,
            amount_paise: None,
            reservation_token: None,
        }
    }

    fn signed_callback(receipt: &OrderReceipt, payment_id: &str) -> GatewayCallback {
        GatewayCallback {
            order_id: receipt.order_id,
            gateway_payment_id: payment_id.to_string(),
            signature: signature::sign(SECRET, &receipt.gateway_order_id, payment_id),
        }
    }

    #[tokio::test]
    async fn test_position_purchase_happy_path() {
        let (slots, ledger, orchestrator) = orchestrator();
        let now = Utc::now();

        let receipt = orchestrator
            .create_order_at(request(position(Rank::First)), now)
            .await
            .unwrap();
        assert_eq!(receipt.state, "RESERVED");
        assert_eq!(receipt.amount_paise, 1_999_00);

        // Rank is blocked while payment is pending
        assert_eq!(
            slots
                .reserve_at(7, "koramangala", Rank::First, F2, Duration::minutes(15), now)
                .unwrap_err(),
            SlotError::RankTaken
        );

        let verified = orchestrator
            .verify_at(signed_callback(&receipt, "pay_1"), now)
            .unwrap();
        assert_eq!(verified.state, "VERIFIED");

        let avail = slots.availability_at(7, "koramangala", F1, now);
        assert_eq!(avail.current_rank, Some(Rank::First));
        assert!(ledger.is_entitled_at(F1, PlanType::Position, Some((7, "koramangala")), now));
    }

    #[tokio::test]
    async fn test_amount_mismatch_rejected() {
        let (_, _, orchestrator) = orchestrator();
        let mut req = request(position(Rank::Second));
        req.amount_paise = Some(1); // client-side tampering

        let err = orchestrator.create_order_at(req, Utc::now()).await.unwrap_err();
        assert_eq!(
            err,
            PaymentError::AmountMismatch {
                expected_paise: 999_00
            }
        );
    }

    #[tokio::test]
    async fn test_tampered_signature_releases_hold() {
        let (slots, ledger, orchestrator) = orchestrator();
        let now = Utc::now();

        let receipt = orchestrator
            .create_order_at(request(position(Rank::First)), now)
            .await
            .unwrap();

        let mut cb = signed_callback(&receipt, "pay_1");
        cb.signature = signature::sign(b"wrong_secret", &receipt.gateway_order_id, "pay_1");

        let err = orchestrator.verify_at(cb, now).unwrap_err();
        assert_eq!(err, PaymentError::SignatureMismatch);

        let order = orchestrator.get(receipt.order_id).unwrap();
        assert_eq!(order.state, OrderState::Failed);

        // The hold was released, not committed
        let avail = slots.availability_at(7, "koramangala", F2, now);
        assert!(avail.taken_ranks.is_empty());
        assert!(!ledger.is_entitled_at(F1, PlanType::Position, Some((7, "koramangala")), now));
    }

    #[tokio::test]
    async fn test_verify_replay_is_idempotent() {
        let (slots, _, orchestrator) = orchestrator();
        let now = Utc::now();

        let receipt = orchestrator
            .create_order_at(request(position(Rank::First)), now)
            .await
            .unwrap();
        let cb = signed_callback(&receipt, "pay_1");

        orchestrator.verify_at(cb.clone(), now).unwrap();
        let replay = orchestrator.verify_at(cb, now).unwrap();
        assert_eq!(replay.state, "VERIFIED");

        // Still exactly one committed slot
        let avail = slots.availability_at(7, "koramangala", F1, now);
        assert_eq!(avail.taken_ranks, vec![Rank::First]);
    }

    #[tokio::test]
    async fn test_commit_after_hold_lapse_goes_to_reconciliation() {
        let (slots, _, orchestrator) = orchestrator();
        let now = Utc::now();

        let receipt = orchestrator
            .create_order_at(request(position(Rank::First)), now)
            .await
            .unwrap();

        // Callback lands after the 15-minute hold lapsed
        let late = now + Duration::minutes(20);
        let err = orchestrator
            .verify_at(signed_callback(&receipt, "pay_1"), late)
            .unwrap_err();
        assert!(matches!(err, PaymentError::ReconciliationRequired(_)));

        let order = orchestrator.get(receipt.order_id).unwrap();
        assert_eq!(order.state, OrderState::Failed);
        assert_eq!(orchestrator.reconciliation().len(), 1);

        // The rank is vacant for others, never double-committed
        assert!(
            slots
                .reserve_at(7, "koramangala", Rank::First, F2, Duration::minutes(15), late)
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_lead_plan_purchase_grants_entitlement() {
        let (_, ledger, orchestrator) = orchestrator();
        let now = Utc::now();

        let receipt = orchestrator
            .create_order_at(request(Purpose::LeadPlan), now)
            .await
            .unwrap();
        assert_eq!(receipt.amount_paise, 499_00);
        assert!(receipt.hold_expires_at.is_none());

        orchestrator
            .verify_at(signed_callback(&receipt, "pay_1"), now)
            .unwrap();
        assert!(ledger.is_entitled_at(F1, PlanType::Lead, None, now));
    }

    #[tokio::test]
    async fn test_lead_plan_renewal_extends() {
        let (_, ledger, orchestrator) = orchestrator();
        let now = Utc::now();

        for payment in ["pay_1", "pay_2"] {
            let receipt = orchestrator
                .create_order_at(request(Purpose::LeadPlan), now)
                .await
                .unwrap();
            orchestrator
                .verify_at(signed_callback(&receipt, payment), now)
                .unwrap();
        }

        // Two 30-day purchases extend, they do not overlap
        assert_eq!(
            ledger.active_until(F1, PlanType::Lead, None, now),
            Some(now + Duration::days(60))
        );
    }

    #[tokio::test]
    async fn test_expire_stale_releases_abandoned_checkout() {
        let (slots, _, orchestrator) = orchestrator();
        let now = Utc::now();

        let receipt = orchestrator
            .create_order_at(request(position(Rank::Second)), now)
            .await
            .unwrap();

        let later = now + Duration::minutes(16);
        assert_eq!(orchestrator.expire_stale(later), 1);
        assert_eq!(orchestrator.expire_stale(later), 0); // idempotent

        let order = orchestrator.get(receipt.order_id).unwrap();
        assert_eq!(order.state, OrderState::Expired);
        assert!(
            slots
                .availability_at(7, "koramangala", F2, later)
                .taken_ranks
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_adopted_reservation_token() {
        let (slots, _, orchestrator) = orchestrator();
        let now = Utc::now();

        let token = slots
            .reserve_at(7, "koramangala", Rank::Third, F1, Duration::minutes(15), now)
            .unwrap();

        let mut req = request(position(Rank::Third));
        req.reservation_token = Some(token.clone());

        let receipt = orchestrator.create_order_at(req, now).await.unwrap();
        orchestrator
            .verify_at(signed_callback(&receipt, "pay_1"), now)
            .unwrap();

        assert_eq!(
            slots.availability_at(7, "koramangala", F1, now).current_rank,
            Some(Rank::Third)
        );
    }

    #[tokio::test]
    async fn test_adopted_token_must_match_buyer() {
        let (slots, _, orchestrator) = orchestrator();
        let now = Utc::now();

        let token = slots
            .reserve_at(7, "koramangala", Rank::Third, F2, Duration::minutes(15), now)
            .unwrap();

        let mut req = request(position(Rank::Third)); // buyer is F1
        req.reservation_token = Some(token);

        let err = orchestrator.create_order_at(req, now).await.unwrap_err();
        assert_eq!(err, PaymentError::ReservationMismatch);
    }
}
