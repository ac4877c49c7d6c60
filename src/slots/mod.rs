//! Position Slot Registry
//!
//! Authoritative map of the three purchasable position ranks per
//! (category, area). Allocation is a two-phase handshake:
//!
//! ```text
//! reserve ──▶ HELD (time-boxed) ──commit──▶ COMMITTED (entitlement-backed)
//!                    │
//!                    └── hold lapses / release ──▶ vacant
//! ```
//!
//! # Safety Invariants
//!
//! 1. At most one holder per (category, area, rank), ever
//! 2. A freelancer holds at most one rank per (category, area)
//! 3. First reservation wins; a concurrent loser fails, it never queues
//! 4. Expired holds and slots are vacant at read time (lazy expiry)

pub mod error;
pub mod registry;
pub mod types;

pub use error::SlotError;
pub use registry::SlotRegistry;
pub use types::{Availability, PositionSlot, ReservationToken, ScopeKey};
