//! Subscription Ledger
//!
//! Tracks each freelancer's active plan entitlements (lead plan, position
//! plan, badge) with validity windows. Entitlement checks never error: an
//! unknown freelancer is simply not entitled. Expiry is computed at read
//! time; the background sweep only prunes and reconciles.

pub mod ledger;
pub mod types;

pub use ledger::SubscriptionLedger;
pub use types::{BadgeKind, PlanType, PositionScope, SubscriptionEntitlement};
