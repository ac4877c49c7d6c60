//! Lead Dispatch & Acceptance
//!
//! A customer-posted requirement becomes a Lead, fanned out to every
//! freelancer registered for the matching (category, area). Freelancers
//! race to accept; exactly one wins and receives the customer contact.
//!
//! # Safety Invariants
//!
//! 1. open → accepted happens exactly once; `accepted_by` is immutable
//! 2. Entitlement is checked before the transition attempt - a freelancer
//!    who cannot legally win never mutates the lead
//! 3. Expiry and acceptance race on the same per-lead entry lock

pub mod acceptance;
pub mod dispatcher;
pub mod error;
pub mod types;

pub use acceptance::AcceptanceCoordinator;
pub use dispatcher::LeadDispatcher;
pub use error::LeadError;
pub use types::{BudgetRange, CustomerContact, Lead, LeadId, LeadStatus, LeadSummary, PostLead};
