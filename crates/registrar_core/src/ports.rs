//! crates/registrar_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or tokens.

use async_trait::async_trait;
use rust_decimal::Decimal;
use crate::domain::{
    AttendanceRow, AuthClaims, CourseDetails, CourseFields, Department, FacultyDetails,
    FacultyUpdate, MarksRow, NewAttendance, NewFaculty, NewMarks, NewStudent, NewSubject,
    NewUser, StudentDetails, StudentUpdate, SubjectDetails, SubjectUpdate, UserAccount,
    UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Errors from the token collaborator. Expired, malformed, tampered and
/// wrong-key tokens are deliberately indistinguishable to callers.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid,
    #[error("token signing failed: {0}")]
    Signing(String),
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The single store port behind every entity operation. Implementations must
/// enforce the schema's uniqueness and cascade rules; callers rely on
/// `PortError::Conflict` for duplicate keys and `PortError::NotFound` for
/// ids that do not resolve (including zero-rows-affected updates/deletes).
#[async_trait]
pub trait RecordStore: Send + Sync {
    // --- Users and Auth ---
    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_user(&self, user: NewUser) -> PortResult<i64>;

    async fn list_users(&self) -> PortResult<Vec<UserAccount>>;

    // --- Departments ---
    async fn create_department(&self, dept_code: &str, dept_name: &str) -> PortResult<i64>;

    async fn list_departments(&self) -> PortResult<Vec<Department>>;

    async fn get_department_by_id(&self, department_id: i64) -> PortResult<Department>;

    async fn update_department(
        &self,
        department_id: i64,
        dept_code: &str,
        dept_name: &str,
    ) -> PortResult<()>;

    async fn delete_department(&self, department_id: i64) -> PortResult<()>;

    // --- Courses ---
    async fn create_course(&self, fields: CourseFields) -> PortResult<i64>;

    async fn list_courses(&self) -> PortResult<Vec<CourseDetails>>;

    async fn get_course_by_id(&self, course_id: i64) -> PortResult<CourseDetails>;

    async fn update_course(&self, course_id: i64, fields: CourseFields) -> PortResult<()>;

    async fn delete_course(&self, course_id: i64) -> PortResult<()>;

    // --- Students (composite operations touch users + students atomically) ---
    async fn create_student(&self, student: NewStudent) -> PortResult<i64>;

    async fn list_students(&self) -> PortResult<Vec<StudentDetails>>;

    async fn get_student_by_id(&self, student_id: i64) -> PortResult<StudentDetails>;

    async fn update_student(&self, student_id: i64, update: StudentUpdate) -> PortResult<()>;

    /// Deletes the owning user row; the student row and its attendance/marks
    /// go with it via the schema's cascades.
    async fn delete_student(&self, student_id: i64) -> PortResult<()>;

    // --- Faculty ---
    async fn create_faculty(&self, faculty: NewFaculty) -> PortResult<i64>;

    async fn list_faculty(&self) -> PortResult<Vec<FacultyDetails>>;

    async fn get_faculty_by_id(&self, faculty_id: i64) -> PortResult<FacultyDetails>;

    async fn update_faculty(&self, faculty_id: i64, update: FacultyUpdate) -> PortResult<()>;

    async fn delete_faculty(&self, faculty_id: i64) -> PortResult<()>;

    // --- Subjects ---
    /// Fails NotFound when the referenced course does not exist.
    async fn create_subject(&self, subject: NewSubject) -> PortResult<i64>;

    async fn list_subjects(&self) -> PortResult<Vec<SubjectDetails>>;

    async fn get_subject_by_id(&self, subject_id: i64) -> PortResult<SubjectDetails>;

    async fn update_subject(&self, subject_id: i64, update: SubjectUpdate) -> PortResult<()>;

    /// Fails NotFound when either the subject or the faculty id does not resolve.
    async fn assign_faculty(&self, subject_id: i64, faculty_id: i64) -> PortResult<()>;

    async fn delete_subject(&self, subject_id: i64) -> PortResult<()>;

    // --- Attendance ---
    /// A second record for the same (student, subject, date) fails Conflict.
    async fn record_attendance(&self, attendance: NewAttendance) -> PortResult<i64>;

    async fn attendance_for_student(&self, student_id: i64) -> PortResult<Vec<AttendanceRow>>;

    async fn attendance_for_subject(&self, subject_id: i64) -> PortResult<Vec<AttendanceRow>>;

    /// All attendance records, newest date first.
    async fn list_attendance(&self) -> PortResult<Vec<AttendanceRow>>;

    async fn delete_attendance(&self, attendance_id: i64) -> PortResult<()>;

    // --- Marks ---
    /// A second record for the same (student, subject) fails Conflict; the
    /// caller-facing message directs to update instead.
    async fn record_marks(&self, marks: NewMarks) -> PortResult<i64>;

    async fn update_marks(
        &self,
        marks_id: i64,
        internal_marks: Option<Decimal>,
        external_marks: Option<Decimal>,
    ) -> PortResult<()>;

    async fn marks_for_student(&self, student_id: i64) -> PortResult<Vec<MarksRow>>;

    async fn marks_for_subject(&self, subject_id: i64) -> PortResult<Vec<MarksRow>>;

    async fn list_marks(&self) -> PortResult<Vec<MarksRow>>;

    async fn delete_marks(&self, marks_id: i64) -> PortResult<()>;
}

/// Signs and verifies the bearer tokens carried by authenticated requests.
pub trait TokenService: Send + Sync {
    fn issue(&self, claims: &AuthClaims) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError>;
}
