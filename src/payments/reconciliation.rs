//! Reconciliation queue
//!
//! A verified payment whose resource commit failed means money was captured
//! and the resource was lost. That is not locally recoverable: the record
//! goes to an operator queue and is never silently swallowed.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::error;

use crate::core_types::FreelancerId;

use super::types::{OrderId, Purpose};

/// One escalated payment awaiting manual resolution.
#[derive(Debug, Clone)]
pub struct ReconciliationRecord {
    pub order_id: OrderId,
    pub freelancer: FreelancerId,
    pub purpose: Purpose,
    pub gateway_payment_id: String,
    pub reason: String,
    pub flagged_at: DateTime<Utc>,
}

/// Operator-facing queue of escalated payments.
#[derive(Default)]
pub struct ReconciliationQueue {
    records: Mutex<Vec<ReconciliationRecord>>,
}

impl ReconciliationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Escalate a record. Logged at error level with full context.
    pub fn push(&self, record: ReconciliationRecord) {
        error!(
            order_id = %record.order_id,
            freelancer = record.freelancer,
            purpose = record.purpose.as_str(),
            gateway_payment_id = %record.gateway_payment_id,
            reason = %record.reason,
            "RECONCILIATION REQUIRED: payment captured but commit failed"
        );
        self.records
            .lock()
            .expect("reconciliation queue poisoned")
            .push(record);
    }

    /// Take all pending records for operator processing.
    pub fn drain(&self) -> Vec<ReconciliationRecord> {
        std::mem::take(
            &mut *self
                .records
                .lock()
                .expect("reconciliation queue poisoned"),
        )
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .expect("reconciliation queue poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
