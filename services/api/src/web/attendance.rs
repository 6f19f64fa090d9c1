//! services/api/src/web/attendance.rs
//!
//! Daily attendance records. Marking is restricted to faculty; per-student and
//! per-subject views are open to every signed-in role. One record may exist
//! per (student, subject, date).

use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use registrar_core::domain::{AttendanceRow, AttendanceStatus, NewAttendance};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::middleware::{authorize, RoleGate, ADMIN_ONLY, EVERYONE, FACULTY_ONLY, STAFF};
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::AppState;
use crate::web::OkMessage;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// An omitted status marks the student present.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub student_id: i64,
    pub subject_id: i64,
    pub date: NaiveDate,
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMarked {
    pub message: String,
    pub attendance_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub attendance_id: i64,
    pub student_id: i64,
    pub roll_no: String,
    pub student_name: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub date: NaiveDate,
    pub status: String,
}

impl From<AttendanceRow> for AttendanceResponse {
    fn from(row: AttendanceRow) -> Self {
        Self {
            attendance_id: row.attendance_id,
            student_id: row.student_id,
            roll_no: row.roll_no,
            student_name: row.student_name,
            subject_id: row.subject_id,
            subject_name: row.subject_name,
            subject_code: row.subject_code,
            date: row.date,
            status: row.status.as_str().to_string(),
        }
    }
}

fn to_responses(rows: Vec<AttendanceRow>) -> Json<Vec<AttendanceResponse>> {
    Json(rows.into_iter().map(AttendanceResponse::from).collect())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/attendance - Mark attendance for a student in a subject
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 200, description = "Attendance marked", body = AttendanceMarked),
        (status = 400, description = "Already marked for that date, or bad status value", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MarkAttendanceRequest>,
) -> Result<Json<AttendanceMarked>, Rejection> {
    let status = match req.status.as_deref() {
        Some(raw) => raw
            .parse::<AttendanceStatus>()
            .map_err(|e| Rejection::bad_request(e.to_string()))?,
        None => AttendanceStatus::Present,
    };

    let attendance_id = state
        .store
        .record_attendance(NewAttendance {
            student_id: req.student_id,
            subject_id: req.subject_id,
            date: req.date,
            status,
        })
        .await
        .map_err(|e| Rejection::from_port("Error marking attendance", e))?;

    Ok(Json(AttendanceMarked {
        message: "Attendance marked successfully".to_string(),
        attendance_id,
    }))
}

/// GET /api/attendance/student/{studentId} - Attendance history for one student
#[utoipa::path(
    get,
    path = "/api/attendance/student/{studentId}",
    params(("studentId" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Records for the student", body = [AttendanceResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn attendance_by_student(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<i64>,
) -> Result<Json<Vec<AttendanceResponse>>, Rejection> {
    let rows = state
        .store
        .attendance_for_student(student_id)
        .await
        .map_err(|e| Rejection::from_port("Error fetching attendance by student", e))?;
    Ok(to_responses(rows))
}

/// GET /api/attendance/subject/{subjectId} - Attendance sheet for one subject
#[utoipa::path(
    get,
    path = "/api/attendance/subject/{subjectId}",
    params(("subjectId" = i64, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Records for the subject", body = [AttendanceResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn attendance_by_subject(
    State(state): State<Arc<AppState>>,
    Path(subject_id): Path<i64>,
) -> Result<Json<Vec<AttendanceResponse>>, Rejection> {
    let rows = state
        .store
        .attendance_for_subject(subject_id)
        .await
        .map_err(|e| Rejection::from_port("Error fetching attendance by subject", e))?;
    Ok(to_responses(rows))
}

/// GET /api/attendance - All attendance records, newest date first
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "All records ordered by date descending", body = [AttendanceResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_attendance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AttendanceResponse>>, Rejection> {
    let rows = state
        .store
        .list_attendance()
        .await
        .map_err(|e| Rejection::from_port("Error fetching attendance records", e))?;
    Ok(to_responses(rows))
}

/// DELETE /api/attendance/{id} - Delete one attendance record
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(("id" = i64, Path, description = "Attendance record id")),
    responses(
        (status = 200, description = "Record deleted", body = OkMessage),
        (status = 404, description = "Attendance record not found", body = ErrorBody)
    )
)]
pub async fn delete_attendance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .delete_attendance(id)
        .await
        .map_err(|e| Rejection::from_port("Error deleting attendance", e))?;
    Ok(OkMessage::new("Attendance record deleted successfully"))
}

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let faculty = Router::new()
        .route("/", post(mark_attendance))
        .layer(from_fn_with_state(
            RoleGate::new(state, FACULTY_ONLY),
            authorize,
        ));
    let everyone = Router::new()
        .route("/student/{studentId}", get(attendance_by_student))
        .route("/subject/{subjectId}", get(attendance_by_subject))
        .layer(from_fn_with_state(
            RoleGate::new(state, EVERYONE),
            authorize,
        ));
    let staff = Router::new()
        .route("/", get(list_attendance))
        .layer(from_fn_with_state(RoleGate::new(state, STAFF), authorize));
    let admin = Router::new()
        .route("/{id}", delete(delete_attendance))
        .layer(from_fn_with_state(
            RoleGate::new(state, ADMIN_ONLY),
            authorize,
        ));
    faculty.merge(everyone).merge(staff).merge(admin)
}
