//! Position slot handlers (availability, reserve)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::identity::Identity;
use crate::slots::{Availability, ReservationToken};

use super::super::state::AppState;
use super::super::types::{ApiResult, ReserveRequest, ok};

/// Rank availability for one (category, area)
///
/// GET /api/v1/positions/availability/{category_id}/{area}
#[utoipa::path(
    get,
    path = "/api/v1/positions/availability/{category_id}/{area}",
    params(
        ("category_id" = u32, Path, description = "Service category"),
        ("area" = String, Path, description = "Service area")
    ),
    responses(
        (status = 200, description = "Current availability snapshot", body = Availability),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Freelancer identity required")
    ),
    tag = "Positions"
)]
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path((category_id, area)): Path<(u32, String)>,
) -> ApiResult<Availability> {
    let freelancer = identity.freelancer()?;
    ok(state.slots.availability(category_id, &area, freelancer))
}

/// Reserve a rank ahead of checkout
///
/// POST /api/v1/positions/reserve
#[utoipa::path(
    post,
    path = "/api/v1/positions/reserve",
    request_body = ReserveRequest,
    responses(
        (status = 200, description = "Hold placed", body = ReservationToken),
        (status = 409, description = "Rank taken or freelancer already in scope"),
        (status = 401, description = "Missing identity")
    ),
    tag = "Positions"
)]
pub async fn reserve_position(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<ReserveRequest>,
) -> ApiResult<ReservationToken> {
    let freelancer = identity.freelancer()?;
    req.validate()?;
    let rank = req.rank()?;

    let token = state
        .slots
        .reserve(req.category, &req.area, rank, freelancer, state.hold)?;
    ok(token)
}
