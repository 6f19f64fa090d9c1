//! services/api/src/web/users.rs
//!
//! Admin-only user administration: create an account with an explicit role,
//! and list all accounts. Password hashes never leave the store layer.

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use registrar_core::domain::{NewUser, Role, UserAccount};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::credentials;
use crate::web::middleware::{authorize, RoleGate, ADMIN_ONLY};
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// One of `admin`, `faculty`, `student`.
    pub role: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserCreated {
    pub message: String,
    pub user_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserAccount> for UserResponse {
    fn from(user: UserAccount) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct UserList {
    pub users: Vec<UserResponse>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/user - Create a user account with an explicit role
#[utoipa::path(
    post,
    path = "/api/user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserCreated),
        (status = 400, description = "Duplicate email or invalid role", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserCreated>), Rejection> {
    let role = req
        .role
        .parse::<Role>()
        .map_err(|e| Rejection::bad_request(e.to_string()))?;
    let password_hash = credentials::hash_password(&req.password)
        .map_err(|e| Rejection::internal("Error creating user", e.to_string()))?;

    let user_id = state
        .store
        .create_user(NewUser {
            name: req.name,
            email: req.email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| Rejection::from_port("Error creating user", e))?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            message: "User created successfully".to_string(),
            user_id,
        }),
    ))
}

/// GET /api/user - List all user accounts
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "All user accounts", body = UserList),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserList>, Rejection> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(|e| Rejection::from_port("Error fetching users", e))?;
    Ok(Json(UserList {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .layer(from_fn_with_state(
            RoleGate::new(state, ADMIN_ONLY),
            authorize,
        ))
}
