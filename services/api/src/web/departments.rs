//! services/api/src/web/departments.rs
//!
//! Department CRUD. Departments are referenced by courses (cascade delete) and
//! by students/faculty (link nulled on delete).
//!
//! Unlike the other entities, department request bodies use the snake_case
//! `dept_code`/`dept_name` keys the frontend already sends.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use registrar_core::domain::Department;
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
pub struct DepartmentRequest {
    pub dept_code: String,
    pub dept_name: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCreated {
    pub message: String,
    pub department_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct DepartmentResponse {
    pub id: i64,
    pub dept_code: String,
    pub dept_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Department> for DepartmentResponse {
    fn from(dept: Department) -> Self {
        Self {
            id: dept.id,
            dept_code: dept.dept_code,
            dept_name: dept.dept_name,
            created_at: dept.created_at,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/department - Create a department
#[utoipa::path(
    post,
    path = "/api/department",
    request_body = DepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentCreated),
        (status = 400, description = "Missing fields or duplicate code", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_department(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DepartmentRequest>,
) -> Result<(StatusCode, Json<DepartmentCreated>), Rejection> {
    if req.dept_code.trim().is_empty() || req.dept_name.trim().is_empty() {
        return Err(Rejection::bad_request(
            "Department name and code are required",
        ));
    }

    let department_id = state
        .store
        .create_department(&req.dept_code, &req.dept_name)
        .await
        .map_err(|e| Rejection::from_port("Error creating department", e))?;

    Ok((
        StatusCode::CREATED,
        Json(DepartmentCreated {
            message: "Department created successfully".to_string(),
            department_id,
        }),
    ))
}

/// GET /api/department - List all departments
#[utoipa::path(
    get,
    path = "/api/department",
    responses(
        (status = 200, description = "All departments", body = [DepartmentResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_departments(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DepartmentResponse>>, Rejection> {
    let departments = state
        .store
        .list_departments()
        .await
        .map_err(|e| Rejection::from_port("Error fetching departments", e))?;
    Ok(Json(
        departments.into_iter().map(DepartmentResponse::from).collect(),
    ))
}

/// GET /api/department/{id} - Fetch one department
#[utoipa::path(
    get,
    path = "/api/department/{id}",
    params(("id" = i64, Path, description = "Department id")),
    responses(
        (status = 200, description = "The department", body = DepartmentResponse),
        (status = 404, description = "Department not found", body = ErrorBody)
    )
)]
pub async fn get_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DepartmentResponse>, Rejection> {
    let department = state
        .store
        .get_department_by_id(id)
        .await
        .map_err(|e| Rejection::from_port("Error fetching department", e))?;
    Ok(Json(department.into()))
}

/// PUT /api/department/{id} - Update a department
#[utoipa::path(
    put,
    path = "/api/department/{id}",
    params(("id" = i64, Path, description = "Department id")),
    request_body = DepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = OkMessage),
        (status = 404, description = "Department not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn update_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<DepartmentRequest>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .update_department(id, &req.dept_code, &req.dept_name)
        .await
        .map_err(|e| Rejection::from_port("Error updating department", e))?;
    Ok(OkMessage::new("Department updated successfully"))
}

/// DELETE /api/department/{id} - Delete a department
///
/// Cascades: the department's courses are removed; student and faculty links
/// to the department are nulled.
#[utoipa::path(
    delete,
    path = "/api/department/{id}",
    params(("id" = i64, Path, description = "Department id")),
    responses(
        (status = 200, description = "Department deleted", body = OkMessage),
        (status = 404, description = "Department not found", body = ErrorBody)
    )
)]
pub async fn delete_department(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<OkMessage>, Rejection> {
    state
        .store
        .delete_department(id)
        .await
        .map_err(|e| Rejection::from_port("Error deleting department", e))?;
    Ok(OkMessage::new("Department deleted successfully"))
}

pub fn routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let admin = Router::new()
        .route("/", post(create_department))
        .route("/{id}", put(update_department).delete(delete_department))
        .layer(from_fn_with_state(
            RoleGate::new(state, ADMIN_ONLY),
            authorize,
        ));
    let everyone = Router::new()
        .route("/", get(list_departments))
        .route("/{id}", get(get_department))
        .layer(from_fn_with_state(
            RoleGate::new(state, EVERYONE),
            authorize,
        ));
    admin.merge(everyone)
}
