//! services/api/src/web/auth.rs
//!
//! The login endpoint. Exchanges an email/password pair for a signed bearer
//! token carrying the user's id, name, email and role.

use axum::{extract::State, routing::post, Json, Router};
use registrar_core::domain::AuthClaims;
use registrar_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::credentials;
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::AppState;

/// One message for both unknown email and wrong password, so a caller cannot
/// probe which emails exist.
const BAD_CREDENTIALS: &str = "Invalid email or password";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/login - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, Rejection> {
    // 1. Reject blank credentials outright.
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(Rejection::unauthenticated("Email or password missing"));
    }

    // 2. Look up the user. An unknown email reads exactly like a bad password.
    let user = match state.store.get_user_by_email(&req.email).await {
        Ok(user) => user,
        Err(PortError::NotFound(_)) => return Err(Rejection::unauthenticated(BAD_CREDENTIALS)),
        Err(e) => return Err(Rejection::from_port("Login failed", e)),
    };

    // 3. Verify the password against the stored hash.
    if !credentials::verify_password(&req.password, &user.password_hash) {
        return Err(Rejection::unauthenticated(BAD_CREDENTIALS));
    }

    // 4. Sign a token embedding the caller's identity and role.
    let claims = AuthClaims {
        user_id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    };
    let token = state
        .tokens
        .issue(&claims)
        .map_err(|e| Rejection::internal("Login failed", e.to_string()))?;

    Ok(Json(LoginResponse {
        message: "Logged in successfully".to_string(),
        token,
    }))
}

/// Login is the only route without a role gate.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}
