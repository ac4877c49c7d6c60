//! End-to-end flows over the public crate API: purchase a rank, win a lead,
//! and the failure paths in between.

use std::sync::Arc;

use chrono::{Duration, Utc};

use leadslot::directory::FreelancerDirectory;
use leadslot::leads::{
    AcceptanceCoordinator, BudgetRange, CustomerContact, LeadDispatcher, LeadError, LeadStatus,
    PostLead,
};
use leadslot::notify::{NotificationTransport, RecordingTransport};
use leadslot::payments::{
    GatewayCallback, MockGateway, OrchestratorSettings, PaymentOrchestrator, Purpose,
    PurchaseRequest, signature,
};
use leadslot::slots::SlotRegistry;
use leadslot::subscriptions::{PlanType, SubscriptionEntitlement, SubscriptionLedger};
use leadslot::sweeper::{Sweeper, SweeperConfig};
use leadslot::{Rank, SlotError};

const SECRET: &[u8] = b"whsec_integration";
const CAT_PLUMBING: u32 = 7;
const AREA: &str = "koramangala";

struct Harness {
    slots: Arc<SlotRegistry>,
    ledger: Arc<SubscriptionLedger>,
    payments: Arc<PaymentOrchestrator>,
    dispatcher: Arc<LeadDispatcher>,
    acceptance: AcceptanceCoordinator,
    transport: Arc<RecordingTransport>,
    directory: Arc<FreelancerDirectory>,
}

fn harness() -> Harness {
    let slots = Arc::new(SlotRegistry::new());
    let ledger = Arc::new(SubscriptionLedger::new());
    let directory = Arc::new(FreelancerDirectory::new());
    let transport = Arc::new(RecordingTransport::new());

    let payments = Arc::new(PaymentOrchestrator::new(
        Arc::clone(&slots),
        Arc::clone(&ledger),
        Arc::new(MockGateway::new()),
        OrchestratorSettings {
            webhook_secret: SECRET.to_vec(),
            ..OrchestratorSettings::default()
        },
    ));

    let dispatcher = Arc::new(LeadDispatcher::new(
        Arc::clone(&directory),
        Arc::clone(&transport) as Arc<dyn NotificationTransport>,
        Duration::hours(24),
    ));
    let acceptance = AcceptanceCoordinator::new(Arc::clone(&dispatcher), Arc::clone(&ledger));

    Harness {
        slots,
        ledger,
        payments,
        dispatcher,
        acceptance,
        transport,
        directory,
    }
}

fn post_lead() -> PostLead {
    PostLead {
        customer: 500,
        contact: CustomerContact {
            name: "Asha".to_string(),
            phone: "+91-9800000001".to_string(),
        },
        category: CAT_PLUMBING,
        area: AREA.to_string(),
        budget: BudgetRange {
            min_paise: 500_00,
            max_paise: 2_000_00,
        },
    }
}

fn callback(
    receipt: &leadslot::payments::OrderReceipt,
    payment_id: &str,
) -> GatewayCallback {
    GatewayCallback {
        order_id: receipt.order_id,
        gateway_payment_id: payment_id.to_string(),
        signature: signature::sign(SECRET, &receipt.gateway_order_id, payment_id),
    }
}

#[tokio::test]
async fn full_position_purchase_lifecycle() {
    let h = harness();
    let now = Utc::now();

    // F1 reserves rank I up front (the UI path), then pays
    let token = h
        .slots
        .reserve_at(CAT_PLUMBING, AREA, Rank::First, 1001, Duration::minutes(15), now)
        .unwrap();

    let receipt = h
        .payments
        .create_order_at(
            PurchaseRequest {
                freelancer: 1001,
                purpose: Purpose::Position {
                    category: CAT_PLUMBING,
                    area: AREA.to_string(),
                    rank: Rank::First,
                },
                amount_paise: Some(1_999_00), // client echo matches
                reservation_token: Some(token),
            },
            now,
        )
        .await
        .unwrap();
    assert_eq!(receipt.state, "RESERVED");

    // While the payment is pending, a competitor cannot take rank I...
    assert_eq!(
        h.slots
            .reserve_at(CAT_PLUMBING, AREA, Rank::First, 1002, Duration::minutes(15), now)
            .unwrap_err(),
        SlotError::RankTaken
    );
    // ...but rank II is fair game
    assert!(
        h.slots
            .reserve_at(CAT_PLUMBING, AREA, Rank::Second, 1002, Duration::minutes(15), now)
            .is_ok()
    );

    // Verified callback commits the slot and grants the entitlement
    h.payments.verify_at(callback(&receipt, "pay_77"), now).unwrap();

    let avail = h.slots.availability_at(CAT_PLUMBING, AREA, 1001, now);
    assert_eq!(avail.current_rank, Some(Rank::First));
    assert!(h.ledger.is_entitled_at(
        1001,
        PlanType::Position,
        Some((CAT_PLUMBING, AREA)),
        now
    ));

    // A month later the entitlement lapses; the sweeper vacates the slot
    let sweeper = Sweeper::new(
        Arc::clone(&h.slots),
        Arc::clone(&h.ledger),
        Arc::clone(&h.payments),
        Arc::clone(&h.dispatcher),
        SweeperConfig::default(),
    );
    let later = now + Duration::days(31);
    let stats = sweeper.pass(later);
    assert_eq!(stats.slots_released, 1);

    // The rank is purchasable again
    assert!(
        h.slots
            .reserve_at(CAT_PLUMBING, AREA, Rank::First, 1002, Duration::minutes(15), later)
            .is_ok()
    );
}

#[tokio::test]
async fn forged_callback_cannot_win_a_slot() {
    let h = harness();
    let now = Utc::now();

    let receipt = h
        .payments
        .create_order_at(
            PurchaseRequest {
                freelancer: 1001,
                purpose: Purpose::Position {
                    category: CAT_PLUMBING,
                    area: AREA.to_string(),
                    rank: Rank::First,
                },
                amount_paise: None,
                reservation_token: None,
            },
            now,
        )
        .await
        .unwrap();

    // Attacker knows the ids but not the webhook secret
    let forged = GatewayCallback {
        order_id: receipt.order_id,
        gateway_payment_id: "pay_evil".to_string(),
        signature: signature::sign(b"guessed_secret", &receipt.gateway_order_id, "pay_evil"),
    };
    assert!(h.payments.verify_at(forged, now).is_err());

    // No slot, no entitlement, order failed
    assert!(
        h.slots
            .availability_at(CAT_PLUMBING, AREA, 1001, now)
            .taken_ranks
            .is_empty()
    );
    assert!(!h.ledger.is_entitled_at(
        1001,
        PlanType::Position,
        Some((CAT_PLUMBING, AREA)),
        now
    ));
}

#[tokio::test]
async fn lead_race_gated_by_entitlement() {
    let h = harness();
    let now = Utc::now();

    // Three freelancers serve the scope; only two hold a lead plan
    for f in [1001u64, 1002, 1003] {
        h.directory.register(f, CAT_PLUMBING, AREA);
    }
    let end = now + Duration::days(30);
    h.ledger.grant(SubscriptionEntitlement::lead_plan(1002, end));
    h.ledger.grant(SubscriptionEntitlement::lead_plan(1003, end));

    let lead_id = h.dispatcher.post_lead_at(post_lead(), now).await;

    // Everyone registered was notified, entitled or not
    let notified: Vec<_> = h.transport.sent().iter().map(|(f, _)| *f).collect();
    assert_eq!(notified, vec![1001, 1002, 1003]);

    // The unentitled freelancer races first and is turned away pre-mutation
    assert_eq!(
        h.acceptance.accept_at(lead_id, 1001, now),
        Err(LeadError::NotEntitled)
    );
    assert_eq!(h.dispatcher.get(lead_id).unwrap().status, LeadStatus::Open);

    // First entitled accept wins and gets the contact
    let contact = h.acceptance.accept_at(lead_id, 1002, now).unwrap();
    assert_eq!(contact.phone, "+91-9800000001");

    // The runner-up sees "someone else got there first"
    assert_eq!(
        h.acceptance.accept_at(lead_id, 1003, now),
        Err(LeadError::AlreadyAccepted)
    );

    // Winner never changes
    let lead = h.dispatcher.get(lead_id).unwrap();
    assert_eq!(lead.status, LeadStatus::Accepted);
    assert_eq!(lead.accepted_by, Some(1002));
}

#[tokio::test]
async fn lead_plan_purchase_unlocks_acceptance() {
    let h = harness();
    let now = Utc::now();

    h.directory.register(1001, CAT_PLUMBING, AREA);
    let lead_id = h.dispatcher.post_lead_at(post_lead(), now).await;

    // Locked out before the purchase
    assert_eq!(
        h.acceptance.accept_at(lead_id, 1001, now),
        Err(LeadError::NotEntitled)
    );

    // Buy the lead plan through the normal payment flow
    let receipt = h
        .payments
        .create_order_at(
            PurchaseRequest {
                freelancer: 1001,
                purpose: Purpose::LeadPlan,
                amount_paise: None,
                reservation_token: None,
            },
            now,
        )
        .await
        .unwrap();
    h.payments.verify_at(callback(&receipt, "pay_1"), now).unwrap();

    // The same accept now wins
    assert!(h.acceptance.accept_at(lead_id, 1001, now).is_ok());
}

#[tokio::test]
async fn abandoned_checkout_frees_the_rank_for_rivals() {
    let h = harness();
    let now = Utc::now();

    let receipt = h
        .payments
        .create_order_at(
            PurchaseRequest {
                freelancer: 1001,
                purpose: Purpose::Position {
                    category: CAT_PLUMBING,
                    area: AREA.to_string(),
                    rank: Rank::Second,
                },
                amount_paise: None,
                reservation_token: None,
            },
            now,
        )
        .await
        .unwrap();
    assert!(receipt.hold_expires_at.is_some());

    // The buyer walks away; 16 minutes later the sweep reclaims everything
    let sweeper = Sweeper::new(
        Arc::clone(&h.slots),
        Arc::clone(&h.ledger),
        Arc::clone(&h.payments),
        Arc::clone(&h.dispatcher),
        SweeperConfig::default(),
    );
    let later = now + Duration::minutes(16);
    let stats = sweeper.pass(later);
    assert_eq!(stats.orders_expired, 1);

    // A rival takes the rank; the original buyer's late payment goes to
    // reconciliation instead of evicting the rival
    assert!(
        h.slots
            .reserve_at(CAT_PLUMBING, AREA, Rank::Second, 1002, Duration::minutes(15), later)
            .is_ok()
    );
    let err = h
        .payments
        .verify_at(callback(&receipt, "pay_late"), later)
        .unwrap_err();
    assert!(matches!(
        err,
        leadslot::payments::PaymentError::ReconciliationRequired(_)
    ));
    assert_eq!(h.payments.reconciliation().len(), 1);
}
