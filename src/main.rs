//! leadslot - services marketplace allocation core
//!
//! Main entry point. Architecture:
//!
//! ```text
//! ┌──────────┐    ┌───────────────┐    ┌──────────────┐
//! │ Gateway  │───▶│ Orchestrator  │───▶│ SlotRegistry │
//! │ (axum)   │    │ (payment FSM) │    │ + Ledger     │
//! └────┬─────┘    └───────────────┘    └──────────────┘
//!      │          ┌───────────────┐    ┌──────────────┐
//!      └─────────▶│ LeadDispatch  │───▶│ Acceptance   │
//!                 │ (fan-out)     │    │ (CAS race)   │
//!                 └───────────────┘    └──────────────┘
//! ```
//!
//! A background sweeper expires stale leads and holds, and releases slots
//! whose backing entitlement lapsed.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;

use leadslot::config::AppConfig;
use leadslot::directory::FreelancerDirectory;
use leadslot::gateway::{self, state::AppState};
use leadslot::leads::{AcceptanceCoordinator, LeadDispatcher};
use leadslot::logging::init_logging;
use leadslot::notify::TracingTransport;
use leadslot::payments::{
    HttpGateway, MockGateway, OrchestratorSettings, PaymentGateway, PaymentOrchestrator,
    PriceTable,
};
use leadslot::slots::SlotRegistry;
use leadslot::subscriptions::SubscriptionLedger;
use leadslot::sweeper::{Sweeper, SweeperConfig};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn build_gateway(config: &AppConfig) -> Arc<dyn PaymentGateway> {
    match config.payment.mode.as_str() {
        "http" => Arc::new(HttpGateway::new(
            config.payment.base_url.clone(),
            config.payment.key_id.clone(),
            config.payment.key_secret.clone(),
        )),
        _ => {
            println!("⚠️  Payment gateway in mock mode (no real PSP connection)");
            Arc::new(MockGateway::new())
        }
    }
}

fn price_table(config: &AppConfig) -> PriceTable {
    let p = &config.payment.prices;
    // Config prices are rupees; the engine works in paise
    PriceTable {
        position_rank_i: p.position_rank_i * 100,
        position_rank_ii: p.position_rank_ii * 100,
        position_rank_iii: p.position_rank_iii * 100,
        lead_plan: p.lead_plan * 100,
        badge: p.badge * 100,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    println!("📋 Config loaded: config/{}.yaml", env);

    let hold = Duration::seconds(config.engine.hold_secs);
    let lead_ttl = Duration::seconds(config.engine.lead_ttl_secs);
    let validity = Duration::days(config.engine.entitlement_validity_days);

    // Core components
    let slots = Arc::new(SlotRegistry::new());
    let ledger = Arc::new(SubscriptionLedger::new());
    let directory = Arc::new(FreelancerDirectory::new());

    let payments = Arc::new(PaymentOrchestrator::new(
        Arc::clone(&slots),
        Arc::clone(&ledger),
        build_gateway(&config),
        OrchestratorSettings {
            webhook_secret: config.payment.webhook_secret.clone().into_bytes(),
            currency: config.payment.currency.clone(),
            hold,
            validity,
            prices: price_table(&config),
        },
    ));

    let dispatcher = Arc::new(LeadDispatcher::new(
        Arc::clone(&directory),
        Arc::new(TracingTransport),
        lead_ttl,
    ));
    let acceptance = Arc::new(AcceptanceCoordinator::new(
        Arc::clone(&dispatcher),
        Arc::clone(&ledger),
    ));

    // Background sweeper
    let sweeper = Sweeper::new(
        Arc::clone(&slots),
        Arc::clone(&ledger),
        Arc::clone(&payments),
        Arc::clone(&dispatcher),
        SweeperConfig {
            interval: StdDuration::from_secs(config.engine.sweep_interval_secs),
        },
    );
    tokio::spawn(async move {
        sweeper.run().await;
    });
    println!("🧹 Sweeper started ({}s interval)", config.engine.sweep_interval_secs);

    // HTTP gateway
    let state = Arc::new(AppState::new(
        slots,
        ledger,
        payments,
        dispatcher,
        acceptance,
        directory,
        hold,
    ));
    gateway::run_server(&config.gateway, state).await
}
