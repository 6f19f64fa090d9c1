//! services/api/src/web/marks.rs
//!
//! Internal/external marks per (student, subject) pair. Faculty own the full
//! write lifecycle here, unlike attendance where deletion is an admin action.
//! At most one record exists per pair; a duplicate create is redirected to
//! update.

use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use registrar_core::domain::{MarksRow, NewMarks};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::middleware::{authorize, RoleGate, EVERYONE, FACULTY_ONLY, STAFF};
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::AppState;
use crate::web::OkMessage;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMarksRequest {
    pub student_id: i64,
    pub subject_id: i64,
    pub internal_marks: Option<Decimal>,
    pub external_marks: Option<Decimal>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMarksRequest {
    pub internal_marks: Option<Decimal>,
    pub external_marks: Option<Decimal>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarksAdded {
    pub message: String,
    pub marks_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct MarksResponse {
    pub marks_id: i64,
    pub student_id: i64,
    pub roll_no: String,
    pub student_name: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub internal_marks: Option<Decimal>,
    pub external_marks: Option<Decimal>,
}

impl From<MarksRow> for MarksResponse {
    fn from(row: MarksRow) -> Self {
        Self {
            marks_id: row.marks_id,
            student_id: row.student_id,
            roll_no: row.roll_no,
            student_name: row.student_name,
            subject_id: row.subject_id,
            subject_name: row.subject_name,
            subject_code: row.subject_code,
            internal_marks: row.internal_marks,
            external_marks: row.external_marks,
        }
    }
}

fn to_responses(rows: Vec<MarksRow>) -> Json<Vec<MarksResponse>> {
    Json(rows.into_iter().map(MarksResponse::from).collect())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/marks - Record marks for a student in a subject
#[utoipa::path(
    post,
    path = "/api/marks",
    request_body = AddMarksRequest,
    responses(
        (status = 200, description = "Marks recorded", body = MarksAdded),
        (status = 400, description = "Marks already exist for the pair", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn add_marks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddMarksRequest>,
) -> Result<Json<MarksAdded>, Rejection> {
    let marks_id = state
        .store
        .record_marks(NewMarks {
            student_id: req.student_id,
            subject_id: req.subject_id,
            internal_marks: req.internal_marks,
            external_marks: req.external_marks,
        })
        .await
        .map_err(|e| Rejection::from_port("Error adding marks", e))?;

    Ok(Json(MarksAdded {
        message: "Marks added successfully".to_string(),
        marks_id,
    }))
}

/// PUT /api/marks/{id} - Replace the scores on an existing record
#[utoipa::path(
    put,
    path = "/api/marks/{id}",
    params(("id" = i64, Path, description = "Marks record id")),
    request_body = UpdateMarksRequest,
    responses(
        (status = 200, description = "Marks updated", body = OkMessage),
        (status = 404, description = "Marks record not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_marks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMarksRequest>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .update_marks(id, req.internal_marks, req.external_marks)
        .await
        .map_err(|e| Rejection::from_port("Error updating marks", e))?;
    Ok(OkMessage::new("Marks updated successfully"))
}

/// GET /api/marks/student/{studentId} - Marks sheet for one student
#[utoipa::path(
    get,
    path = "/api/marks/student/{studentId}",
    params(("studentId" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Records for the student", body = [MarksResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn marks_by_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i64>,
) -> Result<Json<Vec<MarksResponse>>, Rejection> {
    let rows = state
        .store
        .marks_for_student(student_id)
        .await
        .map_err(|e| Rejection::from_port("Error fetching marks by student", e))?;
    Ok(to_responses(rows))
}

/// GET /api/marks/subject/{subjectId} - Marks for every student in a subject
#[utoipa::path(
    get,
    path = "/api/marks/subject/{subjectId}",
    params(("subjectId" = i64, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Records for the subject", body = [MarksResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn marks_by_subject(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<i64>,
) -> Result<Json<Vec<MarksResponse>>, Rejection> {
    let rows = state
        .store
        .marks_for_subject(subject_id)
        .await
        .map_err(|e| Rejection::from_port("Error fetching marks by subject", e))?;
    Ok(to_responses(rows))
}

/// GET /api/marks - All marks records
#[utoipa::path(
    get,
    path = "/api/marks",
    responses(
        (status = 200, description = "All records", body = [MarksResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_marks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MarksResponse>>, Rejection> {
    let rows = state
        .store
        .list_marks()
        .await
        .map_err(|e| Rejection::from_port("Error fetching all marks", e))?;
    Ok(to_responses(rows))
}

/// DELETE /api/marks/{id} - Delete one marks record
#[utoipa::path(
    delete,
    path = "/api/marks/{id}",
    params(("id" = i64, Path, description = "Marks record id")),
    responses(
        (status = 200, description = "Record deleted", body = OkMessage),
        (status = 404, description = "Marks record not found", body = ErrorBody)
    )
)]
pub async fn delete_marks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .delete_marks(id)
        .await
        .map_err(|e| Rejection::from_port("Error deleting marks", e))?;
    Ok(OkMessage::new("Marks record deleted successfully"))
}

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let faculty = Router::new()
        .route("/", post(add_marks))
        .route("/{id}", put(update_marks).delete(delete_marks))
        .layer(from_fn_with_state(
            RoleGate::new(state, FACULTY_ONLY),
            authorize,
        ));
    let everyone = Router::new()
        .route("/student/{studentId}", get(marks_by_student))
        .route("/subject/{subjectId}", get(marks_by_subject))
        .layer(from_fn_with_state(
            RoleGate::new(state, EVERYONE),
            authorize,
        ));
    let staff = Router::new()
        .route("/", get(list_marks))
        .layer(from_fn_with_state(RoleGate::new(state, STAFF), authorize));
    faculty.merge(everyone).merge(staff)
}
