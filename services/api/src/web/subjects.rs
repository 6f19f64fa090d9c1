//! services/api/src/web/subjects.rs
//!
//! Subject CRUD plus the faculty assignment operation. Creation takes the
//! owning course only; the teaching faculty is attached later through
//! `PUT /assign-faculty` or a full update.

use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use registrar_core::domain::{NewSubject, SubjectDetails, SubjectUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::middleware::{authorize, RoleGate, ADMIN_ONLY, EVERYONE};
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::AppState;
use crate::web::OkMessage;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub subject_name: String,
    pub subject_code: String,
    pub course_id: i64,
    pub credits: i32,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubjectRequest {
    pub subject_name: String,
    pub subject_code: String,
    pub course_id: Option<i64>,
    pub credits: i32,
    pub faculty_id: Option<i64>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignFacultyRequest {
    pub subject_id: i64,
    pub faculty_id: i64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectCreated {
    pub message: String,
    pub subject_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct SubjectResponse {
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub credits: i32,
    pub course_id: Option<i64>,
    pub faculty_id: Option<i64>,
    pub course_name: Option<String>,
    pub course_code: Option<String>,
    pub faculty_name: Option<String>,
    pub faculty_email: Option<String>,
}

impl From<SubjectDetails> for SubjectResponse {
    fn from(subject: SubjectDetails) -> Self {
        Self {
            subject_id: subject.id,
            subject_name: subject.subject_name,
            subject_code: subject.subject_code,
            credits: subject.credits,
            course_id: subject.course_id,
            faculty_id: subject.faculty_id,
            course_name: subject.course_name,
            course_code: subject.course_code,
            faculty_name: subject.faculty_name,
            faculty_email: subject.faculty_email,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/subject - Create a subject under an existing course
#[utoipa::path(
    post,
    path = "/api/subject",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = SubjectCreated),
        (status = 400, description = "Duplicate subject code", body = ErrorBody),
        (status = 404, description = "Referenced course does not exist", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSubjectRequest>,
) -> Result<(axum::http::StatusCode, Json<SubjectCreated>), Rejection> {
    let subject_id = state
        .store
        .create_subject(NewSubject {
            subject_name: req.subject_name,
            subject_code: req.subject_code,
            course_id: req.course_id,
            credits: req.credits,
        })
        .await
        .map_err(|e| Rejection::from_port("Error creating subject", e))?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(SubjectCreated {
            message: "Subject created successfully".to_string(),
            subject_id,
        }),
    ))
}

/// GET /api/subject - List all subjects
#[utoipa::path(
    get,
    path = "/api/subject",
    responses(
        (status = 200, description = "All subjects with course and faculty fields", body = [SubjectResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SubjectResponse>>, Rejection> {
    let subjects = state
        .store
        .list_subjects()
        .await
        .map_err(|e| Rejection::from_port("Error getting subjects", e))?;
    Ok(Json(
        subjects.into_iter().map(SubjectResponse::from).collect(),
    ))
}

/// GET /api/subject/{id} - Fetch one subject
#[utoipa::path(
    get,
    path = "/api/subject/{id}",
    params(("id" = i64, Path, description = "Subject id")),
    responses(
        (status = 200, description = "The subject", body = SubjectResponse),
        (status = 404, description = "Subject not found", body = ErrorBody)
    )
)]
pub async fn get_subject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SubjectResponse>, Rejection> {
    let subject = state
        .store
        .get_subject_by_id(id)
        .await
        .map_err(|e| Rejection::from_port("Error getting subject", e))?;
    Ok(Json(subject.into()))
}

/// PUT /api/subject/assign-faculty - Attach a faculty member to a subject
#[utoipa::path(
    put,
    path = "/api/subject/assign-faculty",
    request_body = AssignFacultyRequest,
    responses(
        (status = 200, description = "Faculty assigned", body = OkMessage),
        (status = 404, description = "Subject or faculty not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn assign_faculty(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssignFacultyRequest>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .assign_faculty(req.subject_id, req.faculty_id)
        .await
        .map_err(|e| Rejection::from_port("Error assigning faculty to subject", e))?;
    Ok(OkMessage::new("Faculty assigned to subject successfully"))
}

/// PUT /api/subject/{id} - Update a subject
#[utoipa::path(
    put,
    path = "/api/subject/{id}",
    params(("id" = i64, Path, description = "Subject id")),
    request_body = UpdateSubjectRequest,
    responses(
        (status = 200, description = "Subject updated", body = OkMessage),
        (status = 404, description = "Subject not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_subject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSubjectRequest>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .update_subject(
            id,
            SubjectUpdate {
                subject_name: req.subject_name,
                subject_code: req.subject_code,
                course_id: req.course_id,
                credits: req.credits,
                faculty_id: req.faculty_id,
            },
        )
        .await
        .map_err(|e| Rejection::from_port("Error updating subject", e))?;
    Ok(OkMessage::new("Subject updated successfully"))
}

/// DELETE /api/subject/{id} - Delete a subject
///
/// Attendance and marks recorded against the subject go with it.
#[utoipa::path(
    delete,
    path = "/api/subject/{id}",
    params(("id" = i64, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Subject deleted", body = OkMessage),
        (status = 404, description = "Subject not found", body = ErrorBody)
    )
)]
pub async fn delete_subject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .delete_subject(id)
        .await
        .map_err(|e| Rejection::from_port("Error deleting subject", e))?;
    Ok(OkMessage::new("Subject deleted successfully"))
}

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/", post(create_subject))
        .route("/assign-faculty", put(assign_faculty))
        .route("/{id}", put(update_subject).delete(delete_subject))
        .layer(from_fn_with_state(
            RoleGate::new(state, ADMIN_ONLY),
            authorize,
        ));
    let everyone = Router::new()
        .route("/", get(list_subjects))
        .route("/{id}", get(get_subject))
        .layer(from_fn_with_state(
            RoleGate::new(state, EVERYONE),
            authorize,
        ));
    admin.merge(everyone)
}
