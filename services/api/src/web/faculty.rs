//! services/api/src/web/faculty.rs
//!
//! Faculty CRUD. Mirrors the student module's composite create/update over the
//! user and faculty tables. Listing is limited to staff roles.

use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use registrar_core::domain::{FacultyDetails, FacultyUpdate, NewFaculty};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::credentials;
use crate::web::middleware::{authorize, RoleGate, ADMIN_ONLY, STAFF};
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::AppState;
use crate::web::OkMessage;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacultyRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub faculty_code: String,
    pub phone: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub department_id: Option<i64>,
}

/// Same shape as create, except the password is optional: `None` or blank
/// keeps the current one.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacultyRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub faculty_code: String,
    pub phone: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub department_id: Option<i64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacultyCreated {
    pub message: String,
    pub faculty_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct FacultyResponse {
    pub id: i64,
    pub user_id: i64,
    pub faculty_code: String,
    pub phone: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub department_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub faculty_name: String,
    pub email: String,
    pub dept_code: Option<String>,
    pub dept_name: Option<String>,
}

impl From<FacultyDetails> for FacultyResponse {
    fn from(faculty: FacultyDetails) -> Self {
        Self {
            id: faculty.id,
            user_id: faculty.user_id,
            faculty_code: faculty.faculty_code,
            phone: faculty.phone,
            joining_date: faculty.joining_date,
            department_id: faculty.department_id,
            created_at: faculty.created_at,
            faculty_name: faculty.faculty_name,
            email: faculty.email,
            dept_code: faculty.dept_code,
            dept_name: faculty.dept_name,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/faculty - Create a faculty member together with its login account
#[utoipa::path(
    post,
    path = "/api/faculty",
    request_body = CreateFacultyRequest,
    responses(
        (status = 200, description = "Faculty created", body = FacultyCreated),
        (status = 400, description = "Duplicate email or faculty code", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_faculty(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFacultyRequest>,
) -> Result<Json<FacultyCreated>, Rejection> {
    let password_hash = credentials::hash_password(&req.password)
        .map_err(|e| Rejection::internal("Error creating faculty", e.to_string()))?;

    let faculty_id = state
        .store
        .create_faculty(NewFaculty {
            name: req.name,
            email: req.email,
            password_hash,
            faculty_code: req.faculty_code,
            phone: req.phone,
            joining_date: req.joining_date,
            department_id: req.department_id,
        })
        .await
        .map_err(|e| Rejection::from_port("Error creating faculty", e))?;

    Ok(Json(FacultyCreated {
        message: "Faculty created successfully".to_string(),
        faculty_id,
    }))
}

/// GET /api/faculty - List all faculty members
#[utoipa::path(
    get,
    path = "/api/faculty",
    responses(
        (status = 200, description = "All faculty with user/department fields", body = [FacultyResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_faculty(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FacultyResponse>>, Rejection> {
    let faculty = state
        .store
        .list_faculty()
        .await
        .map_err(|e| Rejection::from_port("Error getting faculties", e))?;
    Ok(Json(faculty.into_iter().map(FacultyResponse::from).collect()))
}

/// GET /api/faculty/{id} - Fetch one faculty member
#[utoipa::path(
    get,
    path = "/api/faculty/{id}",
    params(("id" = i64, Path, description = "Faculty id")),
    responses(
        (status = 200, description = "The faculty member", body = FacultyResponse),
        (status = 404, description = "Faculty not found", body = ErrorBody)
    )
)]
pub async fn get_faculty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<FacultyResponse>, Rejection> {
    let faculty = state
        .store
        .get_faculty_by_id(id)
        .await
        .map_err(|e| Rejection::from_port("Error getting faculty", e))?;
    Ok(Json(faculty.into()))
}

/// PUT /api/faculty/{id} - Update a faculty member and its login account
#[utoipa::path(
    put,
    path = "/api/faculty/{id}",
    params(("id" = i64, Path, description = "Faculty id")),
    request_body = UpdateFacultyRequest,
    responses(
        (status = 200, description = "Faculty updated", body = OkMessage),
        (status = 404, description = "Faculty not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_faculty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateFacultyRequest>,
) -> Result<Json<OkMessage>, Rejection> {
    let password_hash = match &req.password {
        Some(plain) if !plain.trim().is_empty() => Some(
            credentials::hash_password(plain)
                .map_err(|e| Rejection::internal("Error updating faculty", e.to_string()))?,
        ),
        _ => None,
    };

    state
        .store
        .update_faculty(
            id,
            FacultyUpdate {
                name: req.name,
                email: req.email,
                password_hash,
                faculty_code: req.faculty_code,
                phone: req.phone,
                joining_date: req.joining_date,
                department_id: req.department_id,
            },
        )
        .await
        .map_err(|e| Rejection::from_port("Error updating faculty", e))?;

    Ok(OkMessage::new("Faculty updated successfully"))
}

/// DELETE /api/faculty/{id} - Delete a faculty member
///
/// Removes the owning user row; the faculty row follows through the cascade
/// and any taught subjects lose their assignment.
#[utoipa::path(
    delete,
    path = "/api/faculty/{id}",
    params(("id" = i64, Path, description = "Faculty id")),
    responses(
        (status = 200, description = "Faculty deleted", body = OkMessage),
        (status = 404, description = "Faculty not found", body = ErrorBody)
    )
)]
pub async fn delete_faculty(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .delete_faculty(id)
        .await
        .map_err(|e| Rejection::from_port("Error deleting faculty", e))?;
    Ok(OkMessage::new("Faculty deleted successfully"))
}

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/", post(create_faculty))
        .route("/{id}", put(update_faculty).delete(delete_faculty))
        .layer(from_fn_with_state(
            RoleGate::new(state, ADMIN_ONLY),
            authorize,
        ));
    let staff = Router::new()
        .route("/", get(list_faculty))
        .route("/{id}", get(get_faculty))
        .layer(from_fn_with_state(RoleGate::new(state, STAFF), authorize));
    admin.merge(staff)
}
