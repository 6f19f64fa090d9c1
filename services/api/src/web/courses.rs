//! services/api/src/web/courses.rs
//!
//! Course CRUD. A course belongs to a department and is joined with the
//! department's code/name for display.

use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use registrar_core::domain::{CourseDetails, CourseFields};
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

/// Create and full-update share the same field set.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub course_code: String,
    pub course_name: String,
    pub duration_years: i32,
    pub department_id: i64,
}

impl CourseRequest {
    fn into_fields(self) -> CourseFields {
        CourseFields {
            course_code: self.course_code,
            course_name: self.course_name,
            duration_years: self.duration_years,
            department_id: self.department_id,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseCreated {
    pub message: String,
    pub course_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct CourseResponse {
    pub id: i64,
    pub course_name: String,
    pub course_code: String,
    pub department_id: Option<i64>,
    pub duration_years: i32,
    pub created_at: DateTime<Utc>,
    pub dept_code: Option<String>,
    pub dept_name: Option<String>,
}

impl From<CourseDetails> for CourseResponse {
    fn from(course: CourseDetails) -> Self {
        Self {
            id: course.id,
            course_name: course.course_name,
            course_code: course.course_code,
            department_id: course.department_id,
            duration_years: course.duration_years,
            created_at: course.created_at,
            dept_code: course.dept_code,
            dept_name: course.dept_name,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/course - Create a course
#[utoipa::path(
    post,
    path = "/api/course",
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course created", body = CourseCreated),
        (status = 400, description = "Duplicate course code", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CourseRequest>,
) -> Result<Json<CourseCreated>, Rejection> {
    let course_id = state
        .store
        .create_course(req.into_fields())
        .await
        .map_err(|e| Rejection::from_port("Error creating course", e))?;
    Ok(Json(CourseCreated {
        message: "Course created successfully".to_string(),
        course_id,
    }))
}

/// GET /api/course - List all courses
#[utoipa::path(
    get,
    path = "/api/course",
    responses(
        (status = 200, description = "All courses with department fields", body = [CourseResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourseResponse>>, Rejection> {
    let courses = state
        .store
        .list_courses()
        .await
        .map_err(|e| Rejection::from_port("Error getting courses", e))?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// GET /api/course/{id} - Fetch one course
#[utoipa::path(
    get,
    path = "/api/course/{id}",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "The course", body = CourseResponse),
        (status = 404, description = "Course not found", body = ErrorBody)
    )
)]
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CourseResponse>, Rejection> {
    let course = state
        .store
        .get_course_by_id(id)
        .await
        .map_err(|e| Rejection::from_port("Error getting course", e))?;
    Ok(Json(course.into()))
}

/// PUT /api/course/{id} - Update a course
#[utoipa::path(
    put,
    path = "/api/course/{id}",
    params(("id" = i64, Path, description = "Course id")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = OkMessage),
        (status = 404, description = "Course not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CourseRequest>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .update_course(id, req.into_fields())
        .await
        .map_err(|e| Rejection::from_port("Error updating course", e))?;
    Ok(OkMessage::new("Course updated successfully"))
}

/// DELETE /api/course/{id} - Delete a course
///
/// Student and subject links to the course are nulled by the schema.
#[utoipa::path(
    delete,
    path = "/api/course/{id}",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted", body = OkMessage),
        (status = 404, description = "Course not found", body = ErrorBody)
    )
)]
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .delete_course(id)
        .await
        .map_err(|e| Rejection::from_port("Error deleting course", e))?;
    Ok(OkMessage::new("Course deleted successfully"))
}

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/", post(create_course))
        .route("/{id}", put(update_course).delete(delete_course))
        .layer(from_fn_with_state(
            RoleGate::new(state, ADMIN_ONLY),
            authorize,
        ));
    let everyone = Router::new()
        .route("/", get(list_courses))
        .route("/{id}", get(get_course))
        .layer(from_fn_with_state(
            RoleGate::new(state, EVERYONE),
            authorize,
        ));
    admin.merge(everyone)
}
