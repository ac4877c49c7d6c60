//! HTTP Gateway
//!
//! Thin REST surface over the allocation core. Identity extraction happens
//! in middleware; the payment-callback route stays outside it because the
//! HMAC signature in the body is its authentication.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use crate::identity::identity_middleware;
use state::AppState;

/// Build the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes: no identity required
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        // The gateway calls back here; the body signature authenticates it
        .route("/payments/verify", post(handlers::payments::verify_payment));

    // Identity-protected routes
    let private_routes = Router::new()
        .route(
            "/positions/availability/{category_id}/{area}",
            get(handlers::positions::get_availability),
        )
        .route(
            "/positions/reserve",
            post(handlers::positions::reserve_position),
        )
        .route(
            "/payments/create-order",
            post(handlers::payments::create_order),
        )
        .route(
            "/payments/orders/{order_id}",
            get(handlers::payments::get_order),
        )
        .route("/leads", post(handlers::leads::post_lead))
        .route("/leads/{lead_id}/accept", post(handlers::leads::accept_lead))
        .route(
            "/leads/{lead_id}/withdraw",
            post(handlers::leads::withdraw_lead),
        )
        .route("/leads/{lead_id}", get(handlers::leads::get_lead))
        .route(
            "/freelancers/scopes",
            post(handlers::freelancers::register_scope),
        )
        .layer(from_fn(identity_middleware));

    Router::new()
        .nest("/api/v1", public_routes.merge(private_routes))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway server.
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(addr = %addr, "Gateway listening");
    println!("🚀 Gateway listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
