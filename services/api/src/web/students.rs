//! services/api/src/web/students.rs
//!
//! Student CRUD. Create and update are composite operations over the user and
//! student tables; the store runs them in one transaction. An omitted or blank
//! password on update keeps the stored hash.

use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use registrar_core::domain::{Gender, NewStudent, StudentDetails, StudentUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::credentials;
use crate::web::middleware::{authorize, RoleGate, ADMIN_ONLY, EVERYONE};
use crate::web::rejection::{ErrorBody, Rejection};
use crate::web::state::AppState;
use crate::web::OkMessage;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub roll_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_year: Option<i32>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<i64>,
    pub course_id: Option<i64>,
}

/// Same shape as create, except the password is optional: `None` or blank
/// keeps the current one.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub roll_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_year: Option<i32>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<i64>,
    pub course_id: Option<i64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentCreated {
    pub message: String,
    pub student_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct StudentResponse {
    pub id: i64,
    pub user_id: i64,
    pub roll_no: String,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_year: Option<i32>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub department_id: Option<i64>,
    pub course_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub student_name: String,
    pub email: String,
    pub department_name: Option<String>,
    pub course_name: Option<String>,
}

impl From<StudentDetails> for StudentResponse {
    fn from(student: StudentDetails) -> Self {
        Self {
            id: student.id,
            user_id: student.user_id,
            roll_no: student.roll_no,
            date_of_birth: student.date_of_birth,
            admission_year: student.admission_year,
            phone: student.phone,
            address: student.address,
            gender: student.gender.map(|g| g.as_str().to_string()),
            department_id: student.department_id,
            course_id: student.course_id,
            created_at: student.created_at,
            student_name: student.student_name,
            email: student.email,
            department_name: student.department_name,
            course_name: student.course_name,
        }
    }
}

fn parse_gender(raw: Option<String>) -> Result<Option<Gender>, Rejection> {
    raw.as_deref()
        .map(|g| g.parse::<Gender>())
        .transpose()
        .map_err(|e| Rejection::bad_request(e.to_string()))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/student - Create a student together with its login account
#[utoipa::path(
    post,
    path = "/api/student",
    request_body = CreateStudentRequest,
    responses(
        (status = 200, description = "Student created", body = StudentCreated),
        (status = 400, description = "Duplicate email/roll number or bad gender value", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<Json<StudentCreated>, Rejection> {
    let gender = parse_gender(req.gender)?;
    let password_hash = credentials::hash_password(&req.password)
        .map_err(|e| Rejection::internal("Error creating student", e.to_string()))?;

    let student_id = state
        .store
        .create_student(NewStudent {
            name: req.name,
            email: req.email,
            password_hash,
            roll_no: req.roll_number,
            date_of_birth: req.date_of_birth,
            admission_year: req.admission_year,
            phone: req.phone,
            address: req.address,
            gender,
            department_id: req.department_id,
            course_id: req.course_id,
        })
        .await
        .map_err(|e| Rejection::from_port("Error creating student", e))?;

    Ok(Json(StudentCreated {
        message: "Student created successfully".to_string(),
        student_id,
    }))
}

/// GET /api/student - List all students
#[utoipa::path(
    get,
    path = "/api/student",
    responses(
        (status = 200, description = "All students with user/department/course fields", body = [StudentResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_students(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StudentResponse>>, Rejection> {
    let students = state
        .store
        .list_students()
        .await
        .map_err(|e| Rejection::from_port("Error getting students", e))?;
    Ok(Json(
        students.into_iter().map(StudentResponse::from).collect(),
    ))
}

/// GET /api/student/{id} - Fetch one student
#[utoipa::path(
    get,
    path = "/api/student/{id}",
    params(("id" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "The student", body = StudentResponse),
        (status = 404, description = "Student not found", body = ErrorBody)
    )
)]
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<StudentResponse>, Rejection> {
    let student = state
        .store
        .get_student_by_id(id)
        .await
        .map_err(|e| Rejection::from_port("Error getting student", e))?;
    Ok(Json(student.into()))
}

/// PUT /api/student/{id} - Update a student and its login account
#[utoipa::path(
    put,
    path = "/api/student/{id}",
    params(("id" = i64, Path, description = "Student id")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = OkMessage),
        (status = 404, description = "Student not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<Json<OkMessage>, Rejection> {
    let gender = parse_gender(req.gender)?;
    let password_hash = match &req.password {
        Some(plain) if !plain.trim().is_empty() => Some(
            credentials::hash_password(plain)
                .map_err(|e| Rejection::internal("Error updating student", e.to_string()))?,
        ),
        _ => None,
    };

    state
        .store
        .update_student(
            id,
            StudentUpdate {
                name: req.name,
                email: req.email,
                password_hash,
                roll_no: req.roll_number,
                date_of_birth: req.date_of_birth,
                admission_year: req.admission_year,
                phone: req.phone,
                address: req.address,
                gender,
                department_id: req.department_id,
                course_id: req.course_id,
            },
        )
        .await
        .map_err(|e| Rejection::from_port("Error updating student", e))?;

    Ok(OkMessage::new("Student updated successfully"))
}

/// DELETE /api/student/{id} - Delete a student
///
/// Removes the owning user row; the student row and its attendance/marks
/// follow through the schema's cascade rules.
#[utoipa::path(
    delete,
    path = "/api/student/{id}",
    params(("id" = i64, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student deleted", body = OkMessage),
        (status = 404, description = "Student not found", body = ErrorBody)
    )
)]
pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .delete_student(id)
        .await
        .map_err(|e| Rejection::from_port("Error deleting student", e))?;
    Ok(OkMessage::new("Student deleted successfully"))
}

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/", post(create_student))
        .route("/{id}", put(update_student).delete(delete_student))
        .layer(from_fn_with_state(
            RoleGate::new(state, ADMIN_ONLY),
            authorize,
        ));
    let everyone = Router::new()
        .route("/", get(list_students))
        .route("/{id}", get(get_student))
        .layer(from_fn_with_state(
            RoleGate::new(state, EVERYONE),
            authorize,
        ));
    admin.merge(everyone)
}
