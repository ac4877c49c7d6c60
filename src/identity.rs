//! Forwarded-identity extraction.
//!
//! Authentication lives upstream: the identity provider verifies the token
//! and the edge proxy forwards the resolved principal in headers. This core
//! trusts those headers and refuses requests without them - it never issues
//! or validates credentials itself.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::gateway::types::{ApiError, error_codes};

/// Header carrying the authenticated principal id.
pub const IDENTITY_ID_HEADER: &str = "x-identity-id";
/// Header carrying the principal role.
pub const IDENTITY_ROLE_HEADER: &str = "x-identity-role";

/// Who is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Freelancer,
    Customer,
}

impl Role {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "freelancer" => Some(Role::Freelancer),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

/// Authenticated principal injected into request extensions.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: u64,
    pub role: Role,
}

impl Identity {
    /// The freelancer id, or a 403 if the caller is a customer.
    pub fn freelancer(&self) -> Result<u64, ApiError> {
        match self.role {
            Role::Freelancer => Ok(self.user_id),
            Role::Customer => Err(ApiError::new(
                StatusCode::FORBIDDEN,
                error_codes::WRONG_ROLE,
                "Freelancer identity required",
            )),
        }
    }

    /// The customer id, or a 403 if the caller is a freelancer.
    pub fn customer(&self) -> Result<u64, ApiError> {
        match self.role {
            Role::Customer => Ok(self.user_id),
            Role::Freelancer => Err(ApiError::new(
                StatusCode::FORBIDDEN,
                error_codes::WRONG_ROLE,
                "Customer identity required",
            )),
        }
    }
}

/// Axum middleware: extract the forwarded identity or reject with 401.
pub async fn identity_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // Step 1: principal id
    let user_id: u64 = request
        .headers()
        .get(IDENTITY_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                error_codes::MISSING_IDENTITY,
                "Missing or malformed identity headers",
            )
        })?;

    // Step 2: role
    let role = request
        .headers()
        .get(IDENTITY_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(Role::parse)
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::UNAUTHORIZED,
                error_codes::MISSING_IDENTITY,
                "Missing or malformed identity headers",
            )
        })?;

    // Step 3: inject and continue
    request.extensions_mut().insert(Identity { user_id, role });
    Ok(next.run(request).await)
}
