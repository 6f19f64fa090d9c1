//! services/api/src/web/docs.rs
//!
//! The master definition for the OpenAPI specification. Every handler's
//! `#[utoipa::path]` annotation is registered here; the `openapi` binary and
//! the mounted Swagger UI both render from this one struct.

use utoipa::OpenApi;

use crate::web::rejection::ErrorBody;
use crate::web::OkMessage;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::login,
        crate::web::users::create_user,
        crate::web::users::list_users,
        crate::web::departments::create_department,
        crate::web::departments::list_departments,
        crate::web::departments::get_department,
        crate::web::departments::update_department,
        crate::web::departments::delete_department,
        crate::web::courses::create_course,
        crate::web::courses::list_courses,
        crate::web::courses::get_course,
        crate::web::courses::update_course,
        crate::web::courses::delete_course,
        crate::web::subjects::create_subject,
        crate::web::subjects::list_subjects,
        crate::web::subjects::get_subject,
        crate::web::subjects::assign_faculty,
        crate::web::subjects::update_subject,
        crate::web::subjects::delete_subject,
        crate::web::students::create_student,
        crate::web::students::list_students,
        crate::web::students::get_student,
        crate::web::students::update_student,
        crate::web::students::delete_student,
        crate::web::faculty::create_faculty,
        crate::web::faculty::list_faculty,
        crate::web::faculty::get_faculty,
        crate::web::faculty::update_faculty,
        crate::web::faculty::delete_faculty,
        crate::web::attendance::mark_attendance,
        crate::web::attendance::attendance_by_student,
        crate::web::attendance::attendance_by_subject,
        crate::web::attendance::list_attendance,
        crate::web::attendance::delete_attendance,
        crate::web::marks::add_marks,
        crate::web::marks::update_marks,
        crate::web::marks::marks_by_student,
        crate::web::marks::marks_by_subject,
        crate::web::marks::list_marks,
        crate::web::marks::delete_marks,
    ),
    components(
        schemas(
            OkMessage,
            ErrorBody,
            crate::web::auth::LoginRequest,
            crate::web::auth::LoginResponse,
            crate::web::users::CreateUserRequest,
            crate::web::users::UserCreated,
            crate::web::users::UserResponse,
            crate::web::users::UserList,
            crate::web::departments::DepartmentRequest,
            crate::web::departments::DepartmentCreated,
            crate::web::departments::DepartmentResponse,
            crate::web::courses::CourseRequest,
            crate::web::courses::CourseCreated,
            crate::web::courses::CourseResponse,
            crate::web::subjects::CreateSubjectRequest,
            crate::web::subjects::UpdateSubjectRequest,
            crate::web::subjects::AssignFacultyRequest,
            crate::web::subjects::SubjectCreated,
            crate::web::subjects::SubjectResponse,
            crate::web::students::CreateStudentRequest,
            crate::web::students::UpdateStudentRequest,
            crate::web::students::StudentCreated,
            crate::web::students::StudentResponse,
            crate::web::faculty::CreateFacultyRequest,
            crate::web::faculty::UpdateFacultyRequest,
            crate::web::faculty::FacultyCreated,
            crate::web::faculty::FacultyResponse,
            crate::web::attendance::MarkAttendanceRequest,
            crate::web::attendance::AttendanceMarked,
            crate::web::attendance::AttendanceResponse,
            crate::web::marks::AddMarksRequest,
            crate::web::marks::UpdateMarksRequest,
            crate::web::marks::MarksAdded,
            crate::web::marks::MarksResponse,
        )
    ),
    tags(
        (name = "auth", description = "Login and token issuance."),
        (name = "users", description = "Raw user account administration."),
        (name = "departments", description = "Department catalog."),
        (name = "courses", description = "Courses offered by departments."),
        (name = "subjects", description = "Subjects under courses and their faculty assignment."),
        (name = "students", description = "Student records and their login accounts."),
        (name = "faculty", description = "Faculty records and their login accounts."),
        (name = "attendance", description = "Per-day attendance per student and subject."),
        (name = "marks", description = "Internal/external marks per student and subject.")
    )
)]
pub struct ApiDoc;
