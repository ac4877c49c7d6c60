//! Freelancer directory handlers

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::identity::Identity;

use super::super::state::AppState;
use super::super::types::{ApiResult, RegisterScopeRequest, ok};

#[derive(Debug, Serialize, ToSchema)]
pub struct ScopeData {
    pub category: u32,
    pub area: String,
}

/// Register a service scope for lead dispatch
///
/// POST /api/v1/freelancers/scopes
#[utoipa::path(
    post,
    path = "/api/v1/freelancers/scopes",
    request_body = RegisterScopeRequest,
    responses(
        (status = 200, description = "Scope registered", body = ScopeData),
        (status = 400, description = "Invalid parameters"),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Freelancer identity required")
    ),
    tag = "Freelancers"
)]
pub async fn register_scope(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<RegisterScopeRequest>,
) -> ApiResult<ScopeData> {
    let freelancer = identity.freelancer()?;
    req.validate()?;

    state.directory.register(freelancer, req.category, &req.area);
    ok(ScopeData {
        category: req.category,
        area: crate::core_types::normalize_area(&req.area),
    })
}
