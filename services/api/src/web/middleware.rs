//! services/api/src/web/middleware.rs
//!
//! The role-gate middleware protecting every entity route. Each route group is
//! wrapped with a fixed allow-list; the named constants below form the
//! declarative route-to-roles table.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use registrar_core::domain::Role;
use registrar_core::ports::TokenService;
use std::sync::Arc;

use crate::web::rejection::Rejection;
use crate::web::state::AppState;

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const FACULTY_ONLY: &[Role] = &[Role::Faculty];
/// Admin and faculty.
pub const STAFF: &[Role] = &[Role::Admin, Role::Faculty];
/// Any known role. Distinct from an empty list, which admits any
/// authenticated caller regardless of role.
pub const EVERYONE: &[Role] = &[Role::Admin, Role::Faculty, Role::Student];

/// Per-route-group middleware state: the token verifier plus the group's
/// allow-list.
#[derive(Clone)]
pub struct RoleGate {
    tokens: Arc<dyn TokenService>,
    allowed: &'static [Role],
}

impl RoleGate {
    pub fn new(state: &AppState, allowed: &'static [Role]) -> Self {
        Self {
            tokens: state.tokens.clone(),
            allowed,
        }
    }
}

/// Middleware that authenticates the bearer token and checks the caller's role
/// against the gate's allow-list.
///
/// On success the verified claims are inserted into request extensions for
/// handlers that need the caller's identity.
pub async fn authorize(
    State(gate): State<RoleGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, Rejection> {
    // 1. Extract the bearer token ("Authorization: Bearer <token>").
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| Rejection::unauthenticated("Access token missing"))?;

    // 2. Verify signature and expiry.
    let claims = gate
        .tokens
        .verify(token)
        .map_err(|_| Rejection::unauthenticated("Invalid or expired token"))?;

    // 3. Check the role against the allow-list (empty list = any caller).
    if !gate.allowed.is_empty() && !gate.allowed.contains(&claims.role) {
        return Err(Rejection::forbidden("Forbidden: insufficient permissions"));
    }

    // 4. Attach the caller identity and continue to the handler.
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
