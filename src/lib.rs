//! leadslot - services marketplace allocation core
//!
//! The server-side engine behind a freelancer marketplace: three purchasable
//! position ranks per (category, area), a payment-confirmed reservation
//! protocol, and a first-responder-wins race for customer leads.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier aliases and the `Rank` ordinal
//! - [`slots`] - Position slot registry (reserve / commit / release)
//! - [`subscriptions`] - Plan entitlement ledger
//! - [`payments`] - Payment order FSM, gateway client, signature check
//! - [`leads`] - Lead dispatch and the acceptance race
//! - [`directory`] - Freelancer service scopes for dispatch
//! - [`notify`] - Notification transport boundary
//! - [`identity`] - Forwarded-identity extraction
//! - [`gateway`] - Axum REST surface
//! - [`sweeper`] - Background expiry/reconciliation sweep

// Core types - must be first!
pub mod core_types;

// Allocation components
pub mod directory;
pub mod leads;
pub mod notify;
pub mod payments;
pub mod slots;
pub mod subscriptions;

// Service plumbing
pub mod config;
pub mod gateway;
pub mod identity;
pub mod logging;
pub mod sweeper;

// Convenient re-exports at crate root
pub use core_types::{Area, CategoryId, CustomerId, FreelancerId, Rank};
pub use directory::FreelancerDirectory;
pub use leads::{AcceptanceCoordinator, Lead, LeadDispatcher, LeadError, LeadId, LeadStatus};
pub use notify::{NotificationTransport, RecordingTransport, TracingTransport};
pub use payments::{
    OrderId, OrderState, PaymentError, PaymentOrchestrator, PriceTable, Purpose,
};
pub use slots::{Availability, PositionSlot, ReservationToken, SlotError, SlotRegistry};
pub use subscriptions::{PlanType, SubscriptionEntitlement, SubscriptionLedger};
pub use sweeper::{SweepStats, Sweeper, SweeperConfig};
