//! Payment handlers (create order, verify callback, order status)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::identity::Identity;
use crate::payments::types::paise_to_rupees;
use crate::payments::{GatewayCallback, OrderId, OrderReceipt, PurchaseRequest};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, CreateOrderRequest, ok};

/// Open a payment order for a plan purchase
///
/// POST /api/v1/payments/create-order
#[utoipa::path(
    post,
    path = "/api/v1/payments/create-order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order opened, hold attached", body = OrderReceipt),
        (status = 400, description = "Amount mismatch or invalid parameters"),
        (status = 409, description = "Rank already held"),
        (status = 401, description = "Missing identity"),
        (status = 503, description = "Payment gateway unavailable")
    ),
    tag = "Payments"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<OrderReceipt> {
    let freelancer = identity.freelancer()?;
    req.validate()?;

    let receipt = state
        .payments
        .create_order(PurchaseRequest {
            freelancer,
            purpose: req.purpose,
            amount_paise: req.amount_paise,
            reservation_token: req.reservation_token,
        })
        .await?;
    ok(receipt)
}

/// Gateway payment callback
///
/// POST /api/v1/payments/verify
///
/// Unauthenticated route: the HMAC signature inside the body is the
/// authentication.
#[utoipa::path(
    post,
    path = "/api/v1/payments/verify",
    request_body = GatewayCallback,
    responses(
        (status = 200, description = "Payment verified, resource committed", body = OrderReceipt),
        (status = 400, description = "Signature rejected"),
        (status = 410, description = "Order expired before the callback"),
        (status = 500, description = "Payment captured but commit failed; queued for reconciliation")
    ),
    tag = "Payments"
)]
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    Json(cb): Json<GatewayCallback>,
) -> ApiResult<OrderReceipt> {
    let receipt = state.payments.verify(cb)?;
    ok(receipt)
}

/// Order status data for the polling client
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatusData {
    #[schema(value_type = String)]
    pub order_id: OrderId,
    pub state: String,
    pub purpose: String,
    pub amount: String,
    pub gateway_order_id: String,
}

/// Payment order status
///
/// GET /api/v1/payments/orders/{order_id}
#[utoipa::path(
    get,
    path = "/api/v1/payments/orders/{order_id}",
    params(("order_id" = String, Path, description = "Payment order id")),
    responses(
        (status = 200, description = "Order status", body = OrderStatusData),
        (status = 404, description = "Unknown order"),
        (status = 401, description = "Missing identity")
    ),
    tag = "Payments"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(order_id): Path<String>,
) -> ApiResult<OrderStatusData> {
    let freelancer = identity.freelancer()?;
    let order_id: OrderId = order_id
        .parse()
        .map_err(|_| ApiError::bad_request("malformed order id"))?;

    let order = state
        .payments
        .get(order_id)
        // Orders are visible to their buyer only
        .filter(|o| o.freelancer == freelancer)
        .ok_or_else(|| ApiError::not_found(format!("order {} not found", order_id)))?;

    ok(OrderStatusData {
        order_id: order.id,
        state: order.state.as_str().to_string(),
        purpose: order.purpose.as_str().to_string(),
        amount: paise_to_rupees(order.amount_paise),
        gateway_order_id: order.gateway_order_id,
    })
}
