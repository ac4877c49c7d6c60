//! Payment Orchestration
//!
//! Drives the reservation → payment → commit protocol for plan purchases.
//!
//! # State Machine
//!
//! ```text
//! CREATED → RESERVED → VERIFIED
//!              │ ↘
//!              │   FAILED   (signature mismatch, gateway failure,
//!              ▼             commit-after-expiry)
//!           EXPIRED         (hold timeout sweep)
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Verify-before-commit**: the gateway callback signature is checked
//!    bit-for-bit before any state effect; a forged callback can never
//!    produce a VERIFIED order
//! 2. **Reserve-before-charge**: for position purchases the rank hold is
//!    attached to the order before the buyer ever reaches checkout
//! 3. **Commit-then-grant, in that order**: the slot registry is the source
//!    of truth; a missing ledger row is reconcilable, a double slot is not
//! 4. A VERIFIED order corresponds to exactly one committed slot or grant

pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod reconciliation;
pub mod signature;
pub mod state;
pub mod types;

pub use error::PaymentError;
pub use gateway::{GatewayOrder, HttpGateway, MockGateway, PaymentGateway};
pub use orchestrator::{OrchestratorSettings, PaymentOrchestrator, PurchaseRequest};
pub use reconciliation::{ReconciliationQueue, ReconciliationRecord};
pub use state::OrderState;
pub use types::{GatewayCallback, OrderId, OrderReceipt, PaymentOrder, PriceTable, Purpose};
