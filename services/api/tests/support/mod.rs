//! services/api/tests/support/mod.rs
//!
//! Shared harness for the integration suites: an in-memory `RecordStore`
//! standing in for Postgres, and a `TestApp` that mounts the real router over
//! it. The fake enforces the same uniqueness and cascade contract as the
//! schema, so route tests observe production behavior without a database.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use http_body_util::BodyExt;
use registrar_core::domain::{
    AttendanceRow, AttendanceStatus, AuthClaims, CourseDetails, CourseFields, Department,
    FacultyDetails, FacultyUpdate, Gender, MarksRow, NewAttendance, NewFaculty, NewMarks,
    NewStudent, NewSubject, NewUser, Role, StudentDetails, StudentUpdate, SubjectDetails,
    SubjectUpdate, UserAccount, UserCredentials,
};
use registrar_core::ports::{PortError, PortResult, RecordStore, TokenService};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use api_lib::adapters::JwtTokens;
use api_lib::web::{self, AppState};

//=========================================================================================
// In-Memory Rows
//=========================================================================================

#[derive(Clone)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct DepartmentRow {
    id: i64,
    dept_code: String,
    dept_name: String,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct CourseRow {
    id: i64,
    course_code: String,
    course_name: String,
    duration_years: i32,
    department_id: Option<i64>,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct StudentRow {
    id: i64,
    user_id: i64,
    roll_no: String,
    date_of_birth: Option<NaiveDate>,
    admission_year: Option<i32>,
    phone: Option<String>,
    address: Option<String>,
    gender: Option<Gender>,
    department_id: Option<i64>,
    course_id: Option<i64>,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct FacultyRow {
    id: i64,
    user_id: i64,
    faculty_code: String,
    phone: Option<String>,
    joining_date: Option<NaiveDate>,
    department_id: Option<i64>,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct SubjectRow {
    id: i64,
    subject_name: String,
    subject_code: String,
    course_id: Option<i64>,
    faculty_id: Option<i64>,
    credits: i32,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct AttendanceEntry {
    id: i64,
    student_id: i64,
    subject_id: i64,
    date: NaiveDate,
    status: AttendanceStatus,
}

#[derive(Clone)]
struct MarksEntry {
    id: i64,
    student_id: i64,
    subject_id: i64,
    internal_marks: Option<Decimal>,
    external_marks: Option<Decimal>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<UserRow>,
    departments: Vec<DepartmentRow>,
    courses: Vec<CourseRow>,
    students: Vec<StudentRow>,
    faculty: Vec<FacultyRow>,
    subjects: Vec<SubjectRow>,
    attendance: Vec<AttendanceEntry>,
    marks: Vec<MarksEntry>,
}

fn conflict(entity: &str, constraint: &str) -> PortError {
    PortError::Conflict(format!("{entity} already exists ({constraint})"))
}

fn not_found(entity: &str) -> PortError {
    PortError::NotFound(format!("{entity} not found"))
}

/// Mimics the NUMERIC(5,2) column: stored values carry exactly two decimals.
fn rescaled(marks: Option<Decimal>) -> Option<Decimal> {
    marks.map(|mut d| {
        d.rescale(2);
        d
    })
}

impl Inner {
    fn next(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    // --- cascade rules, matching the schema's ON DELETE clauses ---

    fn remove_student_row(&mut self, student_id: i64) {
        self.students.retain(|s| s.id != student_id);
        self.attendance.retain(|a| a.student_id != student_id);
        self.marks.retain(|m| m.student_id != student_id);
    }

    fn remove_faculty_row(&mut self, faculty_id: i64) {
        self.faculty.retain(|f| f.id != faculty_id);
        for subject in &mut self.subjects {
            if subject.faculty_id == Some(faculty_id) {
                subject.faculty_id = None;
            }
        }
    }

    fn remove_user_row(&mut self, user_id: i64) {
        self.users.retain(|u| u.id != user_id);
        let student_ids: Vec<i64> = self
            .students
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.id)
            .collect();
        for id in student_ids {
            self.remove_student_row(id);
        }
        let faculty_ids: Vec<i64> = self
            .faculty
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.id)
            .collect();
        for id in faculty_ids {
            self.remove_faculty_row(id);
        }
    }

    fn remove_course_row(&mut self, course_id: i64) {
        self.courses.retain(|c| c.id != course_id);
        for student in &mut self.students {
            if student.course_id == Some(course_id) {
                student.course_id = None;
            }
        }
        for subject in &mut self.subjects {
            if subject.course_id == Some(course_id) {
                subject.course_id = None;
            }
        }
    }

    fn remove_department_row(&mut self, department_id: i64) {
        self.departments.retain(|d| d.id != department_id);
        let course_ids: Vec<i64> = self
            .courses
            .iter()
            .filter(|c| c.department_id == Some(department_id))
            .map(|c| c.id)
            .collect();
        for id in course_ids {
            self.remove_course_row(id);
        }
        for student in &mut self.students {
            if student.department_id == Some(department_id) {
                student.department_id = None;
            }
        }
        for faculty in &mut self.faculty {
            if faculty.department_id == Some(department_id) {
                faculty.department_id = None;
            }
        }
    }

    // --- join builders producing the same shapes as the SQL SELECTs ---

    fn course_details(&self, c: &CourseRow) -> CourseDetails {
        let dept = c
            .department_id
            .and_then(|id| self.departments.iter().find(|d| d.id == id));
        CourseDetails {
            id: c.id,
            course_name: c.course_name.clone(),
            course_code: c.course_code.clone(),
            department_id: c.department_id,
            duration_years: c.duration_years,
            created_at: c.created_at,
            dept_code: dept.map(|d| d.dept_code.clone()),
            dept_name: dept.map(|d| d.dept_name.clone()),
        }
    }

    fn student_details(&self, s: &StudentRow) -> PortResult<StudentDetails> {
        let user = self
            .users
            .iter()
            .find(|u| u.id == s.user_id)
            .ok_or_else(|| not_found("Student"))?;
        Ok(StudentDetails {
            id: s.id,
            user_id: s.user_id,
            roll_no: s.roll_no.clone(),
            date_of_birth: s.date_of_birth,
            admission_year: s.admission_year,
            phone: s.phone.clone(),
            address: s.address.clone(),
            gender: s.gender,
            department_id: s.department_id,
            course_id: s.course_id,
            created_at: s.created_at,
            student_name: user.name.clone(),
            email: user.email.clone(),
            department_name: s
                .department_id
                .and_then(|id| self.departments.iter().find(|d| d.id == id))
                .map(|d| d.dept_name.clone()),
            course_name: s
                .course_id
                .and_then(|id| self.courses.iter().find(|c| c.id == id))
                .map(|c| c.course_name.clone()),
        })
    }

    fn faculty_details(&self, f: &FacultyRow) -> PortResult<FacultyDetails> {
        let user = self
            .users
            .iter()
            .find(|u| u.id == f.user_id)
            .ok_or_else(|| not_found("Faculty"))?;
        let dept = f
            .department_id
            .and_then(|id| self.departments.iter().find(|d| d.id == id));
        Ok(FacultyDetails {
            id: f.id,
            user_id: f.user_id,
            faculty_code: f.faculty_code.clone(),
            phone: f.phone.clone(),
            joining_date: f.joining_date,
            department_id: f.department_id,
            created_at: f.created_at,
            faculty_name: user.name.clone(),
            email: user.email.clone(),
            dept_code: dept.map(|d| d.dept_code.clone()),
            dept_name: dept.map(|d| d.dept_name.clone()),
        })
    }

    fn subject_details(&self, s: &SubjectRow) -> SubjectDetails {
        let course = s
            .course_id
            .and_then(|id| self.courses.iter().find(|c| c.id == id));
        let faculty_user = s
            .faculty_id
            .and_then(|id| self.faculty.iter().find(|f| f.id == id))
            .and_then(|f| self.users.iter().find(|u| u.id == f.user_id));
        SubjectDetails {
            id: s.id,
            subject_name: s.subject_name.clone(),
            subject_code: s.subject_code.clone(),
            credits: s.credits,
            course_id: s.course_id,
            faculty_id: s.faculty_id,
            created_at: s.created_at,
            course_name: course.map(|c| c.course_name.clone()),
            course_code: course.map(|c| c.course_code.clone()),
            faculty_name: faculty_user.map(|u| u.name.clone()),
            faculty_email: faculty_user.map(|u| u.email.clone()),
        }
    }

    fn attendance_row(&self, a: &AttendanceEntry) -> PortResult<AttendanceRow> {
        let student = self
            .students
            .iter()
            .find(|s| s.id == a.student_id)
            .ok_or_else(|| not_found("Attendance record"))?;
        let user = self
            .users
            .iter()
            .find(|u| u.id == student.user_id)
            .ok_or_else(|| not_found("Attendance record"))?;
        let subject = self
            .subjects
            .iter()
            .find(|s| s.id == a.subject_id)
            .ok_or_else(|| not_found("Attendance record"))?;
        Ok(AttendanceRow {
            attendance_id: a.id,
            student_id: a.student_id,
            roll_no: student.roll_no.clone(),
            student_name: user.name.clone(),
            subject_id: a.subject_id,
            subject_name: subject.subject_name.clone(),
            subject_code: subject.subject_code.clone(),
            date: a.date,
            status: a.status,
        })
    }

    fn marks_row(&self, m: &MarksEntry) -> PortResult<MarksRow> {
        let student = self
            .students
            .iter()
            .find(|s| s.id == m.student_id)
            .ok_or_else(|| not_found("Marks record"))?;
        let user = self
            .users
            .iter()
            .find(|u| u.id == student.user_id)
            .ok_or_else(|| not_found("Marks record"))?;
        let subject = self
            .subjects
            .iter()
            .find(|s| s.id == m.subject_id)
            .ok_or_else(|| not_found("Marks record"))?;
        Ok(MarksRow {
            marks_id: m.id,
            student_id: m.student_id,
            roll_no: student.roll_no.clone(),
            student_name: user.name.clone(),
            subject_id: m.subject_id,
            subject_name: subject.subject_name.clone(),
            subject_code: subject.subject_code.clone(),
            internal_marks: m.internal_marks,
            external_marks: m.external_marks,
        })
    }
}

//=========================================================================================
// The Fake Store
//=========================================================================================

/// In-memory `RecordStore` with the schema's uniqueness and cascade rules.
#[derive(Default)]
pub struct FakeStore {
    inner: Mutex<Inner>,
}

impl FakeStore {
    /// Raw row count per table, for asserting cascade effects.
    pub fn counts(&self) -> StoreCounts {
        let inner = self.inner.lock().unwrap();
        StoreCounts {
            users: inner.users.len(),
            departments: inner.departments.len(),
            courses: inner.courses.len(),
            students: inner.students.len(),
            faculty: inner.faculty.len(),
            subjects: inner.subjects.len(),
            attendance: inner.attendance.len(),
            marks: inner.marks.len(),
        }
    }

    /// The stored password hash for a user, for asserting update semantics.
    pub fn password_hash_of(&self, email: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.password_hash.clone())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct StoreCounts {
    pub users: usize,
    pub departments: usize,
    pub courses: usize,
    pub students: usize,
    pub faculty: usize,
    pub subjects: usize,
    pub attendance: usize,
    pub marks: usize,
}

#[async_trait]
impl RecordStore for FakeStore {
    // --- Users and Auth ---

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| UserCredentials {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                password_hash: u.password_hash.clone(),
                role: u.role,
            })
            .ok_or_else(|| not_found("User"))
    }

    async fn create_user(&self, user: NewUser) -> PortResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(conflict("User", "users_email_key"));
        }
        let id = inner.next();
        inner.users.push(UserRow {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_users(&self) -> PortResult<Vec<UserAccount>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .map(|u| UserAccount {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                role: u.role,
                created_at: u.created_at,
            })
            .collect())
    }

    // --- Departments ---

    async fn create_department(&self, dept_code: &str, dept_name: &str) -> PortResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.departments.iter().any(|d| d.dept_code == dept_code) {
            return Err(conflict("Department", "departments_dept_code_key"));
        }
        let id = inner.next();
        inner.departments.push(DepartmentRow {
            id,
            dept_code: dept_code.to_string(),
            dept_name: dept_name.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_departments(&self) -> PortResult<Vec<Department>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .departments
            .iter()
            .map(|d| Department {
                id: d.id,
                dept_code: d.dept_code.clone(),
                dept_name: d.dept_name.clone(),
                created_at: d.created_at,
            })
            .collect())
    }

    async fn get_department_by_id(&self, department_id: i64) -> PortResult<Department> {
        let inner = self.inner.lock().unwrap();
        inner
            .departments
            .iter()
            .find(|d| d.id == department_id)
            .map(|d| Department {
                id: d.id,
                dept_code: d.dept_code.clone(),
                dept_name: d.dept_name.clone(),
                created_at: d.created_at,
            })
            .ok_or_else(|| not_found("Department"))
    }

    async fn update_department(
        &self,
        department_id: i64,
        dept_code: &str,
        dept_name: &str,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .departments
            .iter()
            .any(|d| d.dept_code == dept_code && d.id != department_id)
        {
            return Err(conflict("Department", "departments_dept_code_key"));
        }
        let dept = inner
            .departments
            .iter_mut()
            .find(|d| d.id == department_id)
            .ok_or_else(|| not_found("Department"))?;
        dept.dept_code = dept_code.to_string();
        dept.dept_name = dept_name.to_string();
        Ok(())
    }

    async fn delete_department(&self, department_id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.departments.iter().any(|d| d.id == department_id) {
            return Err(not_found("Department"));
        }
        inner.remove_department_row(department_id);
        Ok(())
    }

    // --- Courses ---

    async fn create_course(&self, fields: CourseFields) -> PortResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .courses
            .iter()
            .any(|c| c.course_code == fields.course_code)
        {
            return Err(conflict("Course", "courses_course_code_key"));
        }
        let id = inner.next();
        inner.courses.push(CourseRow {
            id,
            course_code: fields.course_code,
            course_name: fields.course_name,
            duration_years: fields.duration_years,
            department_id: Some(fields.department_id),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_courses(&self) -> PortResult<Vec<CourseDetails>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .courses
            .iter()
            .map(|c| inner.course_details(c))
            .collect())
    }

    async fn get_course_by_id(&self, course_id: i64) -> PortResult<CourseDetails> {
        let inner = self.inner.lock().unwrap();
        inner
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| inner.course_details(c))
            .ok_or_else(|| not_found("Course"))
    }

    async fn update_course(&self, course_id: i64, fields: CourseFields) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .courses
            .iter()
            .any(|c| c.course_code == fields.course_code && c.id != course_id)
        {
            return Err(conflict("Course", "courses_course_code_key"));
        }
        let course = inner
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or_else(|| not_found("Course"))?;
        course.course_code = fields.course_code;
        course.course_name = fields.course_name;
        course.duration_years = fields.duration_years;
        course.department_id = Some(fields.department_id);
        Ok(())
    }

    async fn delete_course(&self, course_id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.courses.iter().any(|c| c.id == course_id) {
            return Err(not_found("Course"));
        }
        inner.remove_course_row(course_id);
        Ok(())
    }

    // --- Students ---

    async fn create_student(&self, student: NewStudent) -> PortResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == student.email) {
            return Err(conflict("Student", "users_email_key"));
        }
        if inner.students.iter().any(|s| s.roll_no == student.roll_no) {
            return Err(conflict("Student", "students_roll_no_key"));
        }
        let user_id = inner.next();
        inner.users.push(UserRow {
            id: user_id,
            name: student.name,
            email: student.email,
            password_hash: student.password_hash,
            role: Role::Student,
            created_at: Utc::now(),
        });
        let student_id = inner.next();
        inner.students.push(StudentRow {
            id: student_id,
            user_id,
            roll_no: student.roll_no,
            date_of_birth: student.date_of_birth,
            admission_year: student.admission_year,
            phone: student.phone,
            address: student.address,
            gender: student.gender,
            department_id: student.department_id,
            course_id: student.course_id,
            created_at: Utc::now(),
        });
        Ok(student_id)
    }

    async fn list_students(&self) -> PortResult<Vec<StudentDetails>> {
        let inner = self.inner.lock().unwrap();
        inner
            .students
            .iter()
            .map(|s| inner.student_details(s))
            .collect()
    }

    async fn get_student_by_id(&self, student_id: i64) -> PortResult<StudentDetails> {
        let inner = self.inner.lock().unwrap();
        let student = inner
            .students
            .iter()
            .find(|s| s.id == student_id)
            .ok_or_else(|| not_found("Student"))?;
        inner.student_details(student)
    }

    async fn update_student(&self, student_id: i64, update: StudentUpdate) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let user_id = inner
            .students
            .iter()
            .find(|s| s.id == student_id)
            .map(|s| s.user_id)
            .ok_or_else(|| not_found("Student"))?;
        if inner
            .users
            .iter()
            .any(|u| u.email == update.email && u.id != user_id)
        {
            return Err(conflict("Student", "users_email_key"));
        }
        if inner
            .students
            .iter()
            .any(|s| s.roll_no == update.roll_no && s.id != student_id)
        {
            return Err(conflict("Student", "students_roll_no_key"));
        }

        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.name = update.name;
            user.email = update.email;
            if let Some(hash) = update.password_hash {
                user.password_hash = hash;
            }
        }
        if let Some(student) = inner.students.iter_mut().find(|s| s.id == student_id) {
            student.roll_no = update.roll_no;
            student.date_of_birth = update.date_of_birth;
            student.admission_year = update.admission_year;
            student.phone = update.phone;
            student.address = update.address;
            student.gender = update.gender;
            student.department_id = update.department_id;
            student.course_id = update.course_id;
        }
        Ok(())
    }

    async fn delete_student(&self, student_id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let user_id = inner
            .students
            .iter()
            .find(|s| s.id == student_id)
            .map(|s| s.user_id)
            .ok_or_else(|| not_found("Student"))?;
        inner.remove_user_row(user_id);
        Ok(())
    }

    // --- Faculty ---

    async fn create_faculty(&self, faculty: NewFaculty) -> PortResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == faculty.email) {
            return Err(conflict("Faculty", "users_email_key"));
        }
        if inner
            .faculty
            .iter()
            .any(|f| f.faculty_code == faculty.faculty_code)
        {
            return Err(conflict("Faculty", "faculty_faculty_code_key"));
        }
        let user_id = inner.next();
        inner.users.push(UserRow {
            id: user_id,
            name: faculty.name,
            email: faculty.email,
            password_hash: faculty.password_hash,
            role: Role::Faculty,
            created_at: Utc::now(),
        });
        let faculty_id = inner.next();
        inner.faculty.push(FacultyRow {
            id: faculty_id,
            user_id,
            faculty_code: faculty.faculty_code,
            phone: faculty.phone,
            joining_date: faculty.joining_date,
            department_id: faculty.department_id,
            created_at: Utc::now(),
        });
        Ok(faculty_id)
    }

    async fn list_faculty(&self) -> PortResult<Vec<FacultyDetails>> {
        let inner = self.inner.lock().unwrap();
        inner
            .faculty
            .iter()
            .map(|f| inner.faculty_details(f))
            .collect()
    }

    async fn get_faculty_by_id(&self, faculty_id: i64) -> PortResult<FacultyDetails> {
        let inner = self.inner.lock().unwrap();
        let faculty = inner
            .faculty
            .iter()
            .find(|f| f.id == faculty_id)
            .ok_or_else(|| not_found("Faculty"))?;
        inner.faculty_details(faculty)
    }

    async fn update_faculty(&self, faculty_id: i64, update: FacultyUpdate) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let user_id = inner
            .faculty
            .iter()
            .find(|f| f.id == faculty_id)
            .map(|f| f.user_id)
            .ok_or_else(|| not_found("Faculty"))?;
        if inner
            .users
            .iter()
            .any(|u| u.email == update.email && u.id != user_id)
        {
            return Err(conflict("Faculty", "users_email_key"));
        }
        if inner
            .faculty
            .iter()
            .any(|f| f.faculty_code == update.faculty_code && f.id != faculty_id)
        {
            return Err(conflict("Faculty", "faculty_faculty_code_key"));
        }

        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.name = update.name;
            user.email = update.email;
            if let Some(hash) = update.password_hash {
                user.password_hash = hash;
            }
        }
        if let Some(faculty) = inner.faculty.iter_mut().find(|f| f.id == faculty_id) {
            faculty.faculty_code = update.faculty_code;
            faculty.phone = update.phone;
            faculty.joining_date = update.joining_date;
            faculty.department_id = update.department_id;
        }
        Ok(())
    }

    async fn delete_faculty(&self, faculty_id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let user_id = inner
            .faculty
            .iter()
            .find(|f| f.id == faculty_id)
            .map(|f| f.user_id)
            .ok_or_else(|| not_found("Faculty"))?;
        inner.remove_user_row(user_id);
        Ok(())
    }

    // --- Subjects ---

    async fn create_subject(&self, subject: NewSubject) -> PortResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.courses.iter().any(|c| c.id == subject.course_id) {
            return Err(PortError::NotFound(format!(
                "Course {} not found",
                subject.course_id
            )));
        }
        if inner
            .subjects
            .iter()
            .any(|s| s.subject_code == subject.subject_code)
        {
            return Err(conflict("Subject", "subjects_subject_code_key"));
        }
        let id = inner.next();
        inner.subjects.push(SubjectRow {
            id,
            subject_name: subject.subject_name,
            subject_code: subject.subject_code,
            course_id: Some(subject.course_id),
            faculty_id: None,
            credits: subject.credits,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_subjects(&self) -> PortResult<Vec<SubjectDetails>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .subjects
            .iter()
            .map(|s| inner.subject_details(s))
            .collect())
    }

    async fn get_subject_by_id(&self, subject_id: i64) -> PortResult<SubjectDetails> {
        let inner = self.inner.lock().unwrap();
        inner
            .subjects
            .iter()
            .find(|s| s.id == subject_id)
            .map(|s| inner.subject_details(s))
            .ok_or_else(|| not_found("Subject"))
    }

    async fn update_subject(&self, subject_id: i64, update: SubjectUpdate) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .subjects
            .iter()
            .any(|s| s.subject_code == update.subject_code && s.id != subject_id)
        {
            return Err(conflict("Subject", "subjects_subject_code_key"));
        }
        let subject = inner
            .subjects
            .iter_mut()
            .find(|s| s.id == subject_id)
            .ok_or_else(|| not_found("Subject"))?;
        subject.subject_name = update.subject_name;
        subject.subject_code = update.subject_code;
        subject.course_id = update.course_id;
        subject.credits = update.credits;
        subject.faculty_id = update.faculty_id;
        Ok(())
    }

    async fn assign_faculty(&self, subject_id: i64, faculty_id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.subjects.iter().any(|s| s.id == subject_id) {
            return Err(not_found("Subject"));
        }
        if !inner.faculty.iter().any(|f| f.id == faculty_id) {
            return Err(not_found("Faculty"));
        }
        if let Some(subject) = inner.subjects.iter_mut().find(|s| s.id == subject_id) {
            subject.faculty_id = Some(faculty_id);
        }
        Ok(())
    }

    async fn delete_subject(&self, subject_id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.subjects.iter().any(|s| s.id == subject_id) {
            return Err(not_found("Subject"));
        }
        inner.subjects.retain(|s| s.id != subject_id);
        inner.attendance.retain(|a| a.subject_id != subject_id);
        inner.marks.retain(|m| m.subject_id != subject_id);
        Ok(())
    }

    // --- Attendance ---

    async fn record_attendance(&self, attendance: NewAttendance) -> PortResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner.attendance.iter().any(|a| {
            a.student_id == attendance.student_id
                && a.subject_id == attendance.subject_id
                && a.date == attendance.date
        }) {
            return Err(conflict(
                "Attendance record",
                "attendance_student_id_subject_id_date_key",
            ));
        }
        let id = inner.next();
        inner.attendance.push(AttendanceEntry {
            id,
            student_id: attendance.student_id,
            subject_id: attendance.subject_id,
            date: attendance.date,
            status: attendance.status,
        });
        Ok(id)
    }

    async fn attendance_for_student(&self, student_id: i64) -> PortResult<Vec<AttendanceRow>> {
        let inner = self.inner.lock().unwrap();
        inner
            .attendance
            .iter()
            .filter(|a| a.student_id == student_id)
            .map(|a| inner.attendance_row(a))
            .collect()
    }

    async fn attendance_for_subject(&self, subject_id: i64) -> PortResult<Vec<AttendanceRow>> {
        let inner = self.inner.lock().unwrap();
        inner
            .attendance
            .iter()
            .filter(|a| a.subject_id == subject_id)
            .map(|a| inner.attendance_row(a))
            .collect()
    }

    async fn list_attendance(&self) -> PortResult<Vec<AttendanceRow>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<AttendanceRow> = inner
            .attendance
            .iter()
            .map(|a| inner.attendance_row(a))
            .collect::<PortResult<_>>()?;
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn delete_attendance(&self, attendance_id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.attendance.iter().any(|a| a.id == attendance_id) {
            return Err(not_found("Attendance record"));
        }
        inner.attendance.retain(|a| a.id != attendance_id);
        Ok(())
    }

    // --- Marks ---

    async fn record_marks(&self, marks: NewMarks) -> PortResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .marks
            .iter()
            .any(|m| m.student_id == marks.student_id && m.subject_id == marks.subject_id)
        {
            return Err(PortError::Conflict(
                "Marks already exist for this student in this subject. Please use update instead."
                    .to_string(),
            ));
        }
        let id = inner.next();
        inner.marks.push(MarksEntry {
            id,
            student_id: marks.student_id,
            subject_id: marks.subject_id,
            internal_marks: rescaled(marks.internal_marks),
            external_marks: rescaled(marks.external_marks),
        });
        Ok(id)
    }

    async fn update_marks(
        &self,
        marks_id: i64,
        internal_marks: Option<Decimal>,
        external_marks: Option<Decimal>,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner
            .marks
            .iter_mut()
            .find(|m| m.id == marks_id)
            .ok_or_else(|| not_found("Marks record"))?;
        entry.internal_marks = rescaled(internal_marks);
        entry.external_marks = rescaled(external_marks);
        Ok(())
    }

    async fn marks_for_student(&self, student_id: i64) -> PortResult<Vec<MarksRow>> {
        let inner = self.inner.lock().unwrap();
        inner
            .marks
            .iter()
            .filter(|m| m.student_id == student_id)
            .map(|m| inner.marks_row(m))
            .collect()
    }

    async fn marks_for_subject(&self, subject_id: i64) -> PortResult<Vec<MarksRow>> {
        let inner = self.inner.lock().unwrap();
        inner
            .marks
            .iter()
            .filter(|m| m.subject_id == subject_id)
            .map(|m| inner.marks_row(m))
            .collect()
    }

    async fn list_marks(&self) -> PortResult<Vec<MarksRow>> {
        let inner = self.inner.lock().unwrap();
        inner.marks.iter().map(|m| inner.marks_row(m)).collect()
    }

    async fn delete_marks(&self, marks_id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.marks.iter().any(|m| m.id == marks_id) {
            return Err(not_found("Marks record"));
        }
        inner.marks.retain(|m| m.id != marks_id);
        Ok(())
    }
}

//=========================================================================================
// The Test Application
//=========================================================================================

const TEST_SECRET: &[u8] = b"integration-test-secret";

/// The real router mounted over a [`FakeStore`] and a test-keyed signer.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<FakeStore>,
    tokens: Arc<JwtTokens>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(FakeStore::default());
        let tokens = Arc::new(JwtTokens::new(TEST_SECRET, 24));
        let state = Arc::new(AppState {
            store: store.clone(),
            tokens: tokens.clone(),
        });
        Self {
            router: web::router(state),
            store,
            tokens,
        }
    }

    /// A valid bearer token for an arbitrary caller with the given role.
    pub fn token_for(&self, role: Role) -> String {
        let claims = AuthClaims {
            user_id: 9999,
            name: format!("Test {}", role.as_str()),
            email: format!("{}@test.local", role.as_str()),
            role,
        };
        self.tokens.issue(&claims).expect("sign test token")
    }

    /// A structurally valid token signed with a different key, which must be
    /// rejected by this app's verifier.
    pub fn foreign_token(&self, role: Role) -> String {
        let claims = AuthClaims {
            user_id: 9999,
            name: "Impostor".to_string(),
            email: "impostor@test.local".to_string(),
            role,
        };
        JwtTokens::new(b"some-other-secret", 24)
            .issue(&claims)
            .expect("sign foreign token")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, token, None).await
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("route request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}
