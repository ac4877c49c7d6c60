//! Payment order types and the authoritative price table

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use utoipa::ToSchema;

use crate::core_types::{Area, CategoryId, FreelancerId, Rank};
use crate::slots::ReservationToken;
use crate::subscriptions::BadgeKind;

use super::state::OrderState;

/// Payment order ID. Sortable, generated without coordination.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[schema(value_type = String)]
pub struct OrderId(pub Ulid);

impl OrderId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

/// What a payment order buys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Purpose {
    /// 30-day lead-acceptance plan
    LeadPlan,
    /// One rank in one (category, area)
    Position {
        category: CategoryId,
        area: Area,
        rank: Rank,
    },
    /// Profile badge
    Badge { badge: BadgeKind },
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::LeadPlan => "lead_plan",
            Purpose::Position { .. } => "position",
            Purpose::Badge { .. } => "badge",
        }
    }
}

/// Server-side authoritative prices, in paise.
///
/// The client may echo an amount for display but it is never trusted:
/// `create_order` re-derives the price from this table and rejects
/// mismatches.
#[derive(Debug, Clone)]
pub struct PriceTable {
    pub position_rank_i: i64,
    pub position_rank_ii: i64,
    pub position_rank_iii: i64,
    pub lead_plan: i64,
    pub badge: i64,
}

impl Default for PriceTable {
    fn default() -> Self {
        // ₹1999 / ₹999 / ₹699 per rank, ₹499 lead plan, ₹299 badge
        Self {
            position_rank_i: 1_999_00,
            position_rank_ii: 999_00,
            position_rank_iii: 699_00,
            lead_plan: 499_00,
            badge: 299_00,
        }
    }
}

impl PriceTable {
    /// Authoritative amount for a purchase, in paise.
    pub fn amount_paise(&self, purpose: &Purpose) -> i64 {
        match purpose {
            Purpose::LeadPlan => self.lead_plan,
            Purpose::Badge { .. } => self.badge,
            Purpose::Position { rank, .. } => match rank {
                Rank::First => self.position_rank_i,
                Rank::Second => self.position_rank_ii,
                Rank::Third => self.position_rank_iii,
            },
        }
    }
}

/// Convert paise to a rupee string for display ("1999.00").
pub fn paise_to_rupees(paise: i64) -> String {
    let rupees = Decimal::from(paise) / Decimal::from(100);
    format!("{:.2}", rupees)
}

/// A payment order through its lifecycle.
#[derive(Debug, Clone)]
pub struct PaymentOrder {
    pub id: OrderId,
    pub freelancer: FreelancerId,
    pub purpose: Purpose,
    pub amount_paise: i64,
    pub state: OrderState,
    /// Attached rank hold; `None` for lead-plan/badge purchases
    pub reservation: Option<ReservationToken>,
    /// Order id issued by the external gateway
    pub gateway_order_id: String,
    /// Set on verification
    pub gateway_payment_id: Option<String>,
    /// Verified callback signature (hex)
    pub gateway_signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What the client needs to drive the external checkout.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderReceipt {
    #[schema(value_type = String)]
    pub order_id: OrderId,
    pub gateway_order_id: String,
    pub amount_paise: i64,
    /// Display form, rupees
    pub amount: String,
    pub currency: String,
    pub state: String,
    /// Hold deadline for position purchases
    pub hold_expires_at: Option<DateTime<Utc>>,
}

/// Asynchronous callback from the payment gateway.
///
/// The signature is HMAC-SHA256 over `"{gateway_order_id}|{gateway_payment_id}"`
/// with the shared webhook secret, hex-encoded. It is recomputed and compared
/// here regardless of what the gateway SDK already claimed.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GatewayCallback {
    #[schema(value_type = String)]
    pub order_id: OrderId,
    pub gateway_payment_id: String,
    pub signature: String,
}
