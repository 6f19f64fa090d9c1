//! crates/registrar_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted value does not match any known
/// variant of one of the closed value sets below.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized {kind} value: {value}")]
pub struct InvalidValue {
    pub kind: &'static str,
    pub value: String,
}

//=========================================================================================
// Closed Value Sets (stored as CHECK-constrained text columns)
//=========================================================================================

/// The role attached to every user account. Route allow-lists are expressed
/// in terms of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }
}

impl FromStr for Role {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "faculty" => Ok(Role::Faculty),
            "student" => Ok(Role::Student),
            other => Err(InvalidValue {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            other => Err(InvalidValue {
                kind: "gender",
                value: other.to_string(),
            }),
        }
    }
}

/// Per-day attendance state. The store defaults to `Present` when a record is
/// created without an explicit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            other => Err(InvalidValue {
                kind: "attendance status",
                value: other.to_string(),
            }),
        }
    }
}

//=========================================================================================
// Users and Authentication
//=========================================================================================

/// A user account as exposed to administrators. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Draft for a new user row. The password is hashed before it reaches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// The verified identity carried by a bearer token and attached to every
/// authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

//=========================================================================================
// Departments and Courses
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Department {
    pub id: i64,
    pub dept_code: String,
    pub dept_name: String,
    pub created_at: DateTime<Utc>,
}

/// A course joined with its owning department for display.
#[derive(Debug, Clone)]
pub struct CourseDetails {
    pub id: i64,
    pub course_name: String,
    pub course_code: String,
    pub department_id: Option<i64>,
    pub duration_years: i32,
    pub created_at: DateTime<Utc>,
    pub dept_code: Option<String>,
    pub dept_name: Option<String>,
}

/// Create and full-update share the same field set for courses.
#[derive(Debug, Clone)]
pub struct CourseFields {
    pub course_code: String,
    pub course_name: String,
    pub duration_years: i32,
    pub department_id: i64,
}

//=========================================================================================
// Students
//=========================================================================================

/// A student row joined with its owning user and the department/course names.
/// The joined fields are `None` when the referenced row was removed and the
/// foreign key was nulled by the schema's SET NULL rule.
#[derive(Debug, Clone)]
pub struct StudentDetails {
    pub id: i64,
    pub user_id: i64,
    pub roll_no: String,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_year: Option<i32>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<Gender>,
    pub department_id: Option<i64>,
    pub course_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub student_name: String,
    pub email: String,
    pub department_name: Option<String>,
    pub course_name: Option<String>,
}

/// Draft for the composite student create: one user row (role `student`)
/// plus one student row, inserted in a single transaction.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roll_no: String,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_year: Option<i32>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<Gender>,
    pub department_id: Option<i64>,
    pub course_id: Option<i64>,
}

/// Full-replacement update for a student and its owning user. A `None`
/// password hash means the stored hash is kept unchanged.
#[derive(Debug, Clone)]
pub struct StudentUpdate {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub roll_no: String,
    pub date_of_birth: Option<NaiveDate>,
    pub admission_year: Option<i32>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<Gender>,
    pub department_id: Option<i64>,
    pub course_id: Option<i64>,
}

//=========================================================================================
// Faculty
//=========================================================================================

#[derive(Debug, Clone)]
pub struct FacultyDetails {
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

#[derive(Debug, Clone)]
pub struct NewFaculty {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub faculty_code: String,
    pub phone: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub department_id: Option<i64>,
}

/// Full-replacement update mirroring [`StudentUpdate`].
#[derive(Debug, Clone)]
pub struct FacultyUpdate {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub faculty_code: String,
    pub phone: Option<String>,
    pub joining_date: Option<NaiveDate>,
    pub department_id: Option<i64>,
}

//=========================================================================================
// Subjects
//=========================================================================================

/// A subject joined with its course and, when assigned, the teaching faculty's
/// user record.
#[derive(Debug, Clone)]
pub struct SubjectDetails {
    pub id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub credits: i32,
    pub course_id: Option<i64>,
    pub faculty_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub course_name: Option<String>,
    pub course_code: Option<String>,
    pub faculty_name: Option<String>,
    pub faculty_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSubject {
    pub subject_name: String,
    pub subject_code: String,
    pub course_id: i64,
    pub credits: i32,
}

/// Subject update also moves the faculty assignment, unlike create where
/// assignment is a separate operation.
#[derive(Debug, Clone)]
pub struct SubjectUpdate {
    pub subject_name: String,
    pub subject_code: String,
    pub course_id: Option<i64>,
    pub credits: i32,
    pub faculty_id: Option<i64>,
}

//=========================================================================================
// Attendance and Marks
//=========================================================================================

/// One attendance record joined with the student's roll/name and the subject.
#[derive(Debug, Clone)]
pub struct AttendanceRow {
    pub attendance_id: i64,
    pub student_id: i64,
    pub roll_no: String,
    pub student_name: String,
    pub subject_id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub student_id: i64,
    pub subject_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// One marks record joined with the student's roll/name and the subject.
/// At most one such record exists per (student, subject) pair.
#[derive(Debug, Clone)]
pub struct MarksRow {
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

#[derive(Debug, Clone)]
pub struct NewMarks {
    pub student_id: i64,
    pub subject_id: i64,
    pub internal_marks: Option<Decimal>,
    pub external_marks: Option<Decimal>,
}
