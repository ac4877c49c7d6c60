//! OpenAPI document assembly

use utoipa::OpenApi;

use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "leadslot API",
        description = "Scarce-slot allocation and lead-acceptance engine"
    ),
    paths(
        handlers::health::health_check,
        handlers::positions::get_availability,
        handlers::positions::reserve_position,
        handlers::payments::create_order,
        handlers::payments::verify_payment,
        handlers::payments::get_order,
        handlers::leads::post_lead,
        handlers::leads::accept_lead,
        handlers::leads::withdraw_lead,
        handlers::leads::get_lead,
        handlers::freelancers::register_scope,
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Positions", description = "Rank availability and holds"),
        (name = "Payments", description = "Order creation and verification"),
        (name = "Leads", description = "Lead posting and the acceptance race"),
        (name = "Freelancers", description = "Dispatch scope registration")
    )
)]
pub struct ApiDoc;
