//! Lead handlers (post, accept, withdraw, status)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::core_types::FreelancerId;
use crate::identity::Identity;
use crate::leads::{BudgetRange, CustomerContact, LeadId, PostLead};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, PostLeadRequest, ok};

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadCreatedData {
    #[schema(value_type = String)]
    pub lead_id: LeadId,
    pub status: String,
    pub notified: usize,
}

/// Post a job requirement
///
/// POST /api/v1/leads
#[utoipa::path(
    post,
    path = "/api/v1/leads",
    request_body = PostLeadRequest,
    responses(
        (status = 200, description = "Lead created and dispatched", body = LeadCreatedData),
        (status = 400, description = "Invalid parameters"),
        (status = 401, description = "Missing identity"),
        (status = 403, description = "Customer identity required")
    ),
    tag = "Leads"
)]
pub async fn post_lead(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<PostLeadRequest>,
) -> ApiResult<LeadCreatedData> {
    let customer = identity.customer()?;
    req.validate()?;

    let eligible = state.directory.eligible_for(req.category, &req.area).len();
    let lead_id = state
        .dispatcher
        .post_lead(PostLead {
            customer,
            contact: req.contact,
            category: req.category,
            area: req.area,
            budget: req.budget,
        })
        .await;

    ok(LeadCreatedData {
        lead_id,
        status: "open".to_string(),
        notified: eligible,
    })
}

/// Race to accept a lead
///
/// POST /api/v1/leads/{lead_id}/accept
#[utoipa::path(
    post,
    path = "/api/v1/leads/{lead_id}/accept",
    params(("lead_id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Won the race; customer contact released", body = CustomerContact),
        (status = 403, description = "Active lead plan required"),
        (status = 409, description = "Another freelancer got there first"),
        (status = 410, description = "Lead expired or withdrawn"),
        (status = 404, description = "Unknown lead")
    ),
    tag = "Leads"
)]
pub async fn accept_lead(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(lead_id): Path<String>,
) -> ApiResult<CustomerContact> {
    let freelancer = identity.freelancer()?;
    let lead_id: LeadId = lead_id
        .parse()
        .map_err(|_| ApiError::bad_request("malformed lead id"))?;

    let contact = state.acceptance.accept(lead_id, freelancer)?;
    ok(contact)
}

/// Withdraw an open lead
///
/// POST /api/v1/leads/{lead_id}/withdraw
#[utoipa::path(
    post,
    path = "/api/v1/leads/{lead_id}/withdraw",
    params(("lead_id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead withdrawn"),
        (status = 403, description = "Only the posting customer may withdraw"),
        (status = 409, description = "Already accepted"),
        (status = 404, description = "Unknown lead")
    ),
    tag = "Leads"
)]
pub async fn withdraw_lead(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(lead_id): Path<String>,
) -> ApiResult<()> {
    let customer = identity.customer()?;
    let lead_id: LeadId = lead_id
        .parse()
        .map_err(|_| ApiError::bad_request("malformed lead id"))?;

    state.dispatcher.withdraw(lead_id, customer)?;
    ok(())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeadStatusData {
    #[schema(value_type = String)]
    pub lead_id: LeadId,
    pub status: String,
    pub category: u32,
    pub area: String,
    pub budget: BudgetRange,
    pub accepted_by: Option<FreelancerId>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Lead status
///
/// GET /api/v1/leads/{lead_id}
#[utoipa::path(
    get,
    path = "/api/v1/leads/{lead_id}",
    params(("lead_id" = String, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Lead status", body = LeadStatusData),
        (status = 404, description = "Unknown lead")
    ),
    tag = "Leads"
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Extension(_identity): Extension<Identity>,
    Path(lead_id): Path<String>,
) -> ApiResult<LeadStatusData> {
    let lead_id: LeadId = lead_id
        .parse()
        .map_err(|_| ApiError::bad_request("malformed lead id"))?;

    let lead = state
        .dispatcher
        .get(lead_id)
        .ok_or_else(|| ApiError::not_found(format!("lead {} not found", lead_id)))?;

    ok(LeadStatusData {
        lead_id: lead.id,
        status: lead.status.as_str().to_string(),
        category: lead.category,
        area: lead.area,
        budget: lead.budget,
        accepted_by: lead.accepted_by,
        created_at: lead.created_at,
        expires_at: lead.expires_at,
    })
}
