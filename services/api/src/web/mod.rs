//! services/api/src/web/mod.rs
//!
//! The HTTP surface: one submodule per resource, plus the shared state,
//! role-gate middleware, rejection type and OpenAPI master definition.
//! `router` assembles the whole tree under `/api`.

pub mod attendance;
pub mod auth;
pub mod courses;
pub mod departments;
pub mod docs;
pub mod faculty;
pub mod marks;
pub mod middleware;
pub mod rejection;
pub mod state;
pub mod students;
pub mod subjects;
pub mod users;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

pub use state::AppState;

/// Body of every plain acknowledgement response.
#[derive(Serialize, ToSchema)]
pub struct OkMessage {
    pub message: String,
}

impl OkMessage {
    pub fn new(message: &str) -> Json<OkMessage> {
        Json(OkMessage {
            message: message.to_string(),
        })
    }
}

/// GET / - liveness banner, no auth.
async fn banner() -> &'static str {
    "Student record management api working"
}

/// Builds the complete route tree over the shared state. Each resource module
/// contributes its own sub-router with the role gates already layered on.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(banner))
        .nest("/api/student", students::routes(&state))
        .nest("/api/faculty", faculty::routes(&state))
        .nest("/api/subject", subjects::routes(&state))
        .nest("/api/auth", auth::routes())
        .nest("/api/user", users::routes(&state))
        .nest("/api/course", courses::routes(&state))
        .nest("/api/department", departments::routes(&state))
        .nest("/api/attendance", attendance::routes(&state))
        .nest("/api/marks", marks::routes(&state))
        .with_state(state)
}
