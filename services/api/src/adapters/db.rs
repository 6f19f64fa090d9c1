//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `RecordStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Composite operations (student and faculty create/update) run inside one
//! transaction; dropping the transaction on an error path rolls it back before
//! the connection returns to the pool.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use registrar_core::domain::{
    AttendanceRow, CourseDetails, CourseFields, Department, FacultyDetails, FacultyUpdate,
    InvalidValue, MarksRow, NewAttendance, NewFaculty, NewMarks, NewStudent, NewSubject, NewUser,
    Role, StudentDetails, StudentUpdate, SubjectDetails, SubjectUpdate, UserAccount,
    UserCredentials,
};
use registrar_core::ports::{PortError, PortResult, RecordStore};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `RecordStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore` over a shared connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the schema migrations at startup. Already-applied migrations are
    /// recorded and skipped, so re-running is a no-op.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// Error Classification
//=========================================================================================

/// Maps a driver error onto the port taxonomy: a unique-key violation becomes
/// `Conflict`, a missing row becomes `NotFound`, everything else passes through
/// as `Unexpected` with the driver's message intact.
fn classify(entity: &str, err: sqlx::Error) -> PortError {
    match &err {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{entity} not found")),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let constraint = db.constraint().unwrap_or("unique constraint");
            PortError::Conflict(format!("{entity} already exists ({constraint})"))
        }
        _ => PortError::Unexpected(err.to_string()),
    }
}

/// Parses a stored closed-set column (role, gender, status) back into its
/// domain enum. A value outside the CHECK-constrained set means the schema
/// contract was broken, which is an unexpected-store condition.
fn parse_closed<T>(raw: &str) -> PortResult<T>
where
    T: FromStr<Err = InvalidValue>,
{
    raw.parse::<T>()
        .map_err(|e| PortError::Unexpected(e.to_string()))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserAccountRecord {
    id: i64,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserAccountRecord {
    fn to_domain(self) -> PortResult<UserAccount> {
        Ok(UserAccount {
            id: self.id,
            name: self.name,
            email: self.email,
            role: parse_closed(&self.role)?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserCredentialsRecord {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: String,
}

impl UserCredentialsRecord {
    fn to_domain(self) -> PortResult<UserCredentials> {
        Ok(UserCredentials {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password,
            role: parse_closed(&self.role)?,
        })
    }
}

#[derive(FromRow)]
struct DepartmentRecord {
    id: i64,
    dept_code: String,
    dept_name: String,
    created_at: DateTime<Utc>,
}

impl DepartmentRecord {
    fn to_domain(self) -> Department {
        Department {
            id: self.id,
            dept_code: self.dept_code,
            dept_name: self.dept_name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CourseRecord {
    id: i64,
    course_name: String,
    course_code: String,
    department_id: Option<i64>,
    duration_years: i32,
    created_at: DateTime<Utc>,
    dept_code: Option<String>,
    dept_name: Option<String>,
}

impl CourseRecord {
    fn to_domain(self) -> CourseDetails {
        CourseDetails {
            id: self.id,
            course_name: self.course_name,
            course_code: self.course_code,
            department_id: self.department_id,
            duration_years: self.duration_years,
            created_at: self.created_at,
            dept_code: self.dept_code,
            dept_name: self.dept_name,
        }
    }
}

#[derive(FromRow)]
struct StudentRecord {
    id: i64,
    user_id: i64,
    roll_no: String,
    date_of_birth: Option<NaiveDate>,
    admission_year: Option<i32>,
    phone: Option<String>,
    address: Option<String>,
    gender: Option<String>,
    department_id: Option<i64>,
    course_id: Option<i64>,
    created_at: DateTime<Utc>,
    student_name: String,
    email: String,
    department_name: Option<String>,
    course_name: Option<String>,
}

impl StudentRecord {
    fn to_domain(self) -> PortResult<StudentDetails> {
        Ok(StudentDetails {
            id: self.id,
            user_id: self.user_id,
            roll_no: self.roll_no,
            date_of_birth: self.date_of_birth,
            admission_year: self.admission_year,
            phone: self.phone,
            address: self.address,
            gender: self.gender.as_deref().map(parse_closed).transpose()?,
            department_id: self.department_id,
            course_id: self.course_id,
            created_at: self.created_at,
            student_name: self.student_name,
            email: self.email,
            department_name: self.department_name,
            course_name: self.course_name,
        })
    }
}

#[derive(FromRow)]
struct FacultyRecord {
    id: i64,
    user_id: i64,
    faculty_code: String,
    phone: Option<String>,
    joining_date: Option<NaiveDate>,
    department_id: Option<i64>,
    created_at: DateTime<Utc>,
    faculty_name: String,
    email: String,
    dept_code: Option<String>,
    dept_name: Option<String>,
}

impl FacultyRecord {
    fn to_domain(self) -> FacultyDetails {
        FacultyDetails {
            id: self.id,
            user_id: self.user_id,
            faculty_code: self.faculty_code,
            phone: self.phone,
            joining_date: self.joining_date,
            department_id: self.department_id,
            created_at: self.created_at,
            faculty_name: self.faculty_name,
            email: self.email,
            dept_code: self.dept_code,
            dept_name: self.dept_name,
        }
    }
}

#[derive(FromRow)]
struct SubjectRecord {
    id: i64,
    subject_name: String,
    subject_code: String,
    credits: i32,
    course_id: Option<i64>,
    faculty_id: Option<i64>,
    created_at: DateTime<Utc>,
    course_name: Option<String>,
    course_code: Option<String>,
    faculty_name: Option<String>,
    faculty_email: Option<String>,
}

impl SubjectRecord {
    fn to_domain(self) -> SubjectDetails {
        SubjectDetails {
            id: self.id,
            subject_name: self.subject_name,
            subject_code: self.subject_code,
            credits: self.credits,
            course_id: self.course_id,
            faculty_id: self.faculty_id,
            created_at: self.created_at,
            course_name: self.course_name,
            course_code: self.course_code,
            faculty_name: self.faculty_name,
            faculty_email: self.faculty_email,
        }
    }
}

#[derive(FromRow)]
struct AttendanceRecord {
    attendance_id: i64,
    student_id: i64,
    roll_no: String,
    student_name: String,
    subject_id: i64,
    subject_name: String,
    subject_code: String,
    date: NaiveDate,
    status: String,
}

impl AttendanceRecord {
    fn to_domain(self) -> PortResult<AttendanceRow> {
        Ok(AttendanceRow {
            attendance_id: self.attendance_id,
            student_id: self.student_id,
            roll_no: self.roll_no,
            student_name: self.student_name,
            subject_id: self.subject_id,
            subject_name: self.subject_name,
            subject_code: self.subject_code,
            date: self.date,
            status: parse_closed(&self.status)?,
        })
    }
}

#[derive(FromRow)]
struct MarksRecord {
    marks_id: i64,
    student_id: i64,
    roll_no: String,
    student_name: String,
    subject_id: i64,
    subject_name: String,
    subject_code: String,
    internal_marks: Option<Decimal>,
    external_marks: Option<Decimal>,
}

impl MarksRecord {
    fn to_domain(self) -> MarksRow {
        MarksRow {
            marks_id: self.marks_id,
            student_id: self.student_id,
            roll_no: self.roll_no,
            student_name: self.student_name,
            subject_id: self.subject_id,
            subject_name: self.subject_name,
            subject_code: self.subject_code,
            internal_marks: self.internal_marks,
            external_marks: self.external_marks,
        }
    }
}

//=========================================================================================
// Shared Join Queries
//=========================================================================================

// Nullable foreign keys are LEFT JOINed so rows whose department/course/faculty
// reference was nulled by a cascade stay visible in reads.

const SELECT_COURSE: &str = "SELECT courses.id, courses.course_name, courses.course_code, \
     courses.department_id, courses.duration_years, courses.created_at, \
     departments.dept_code, departments.dept_name \
     FROM courses \
     LEFT JOIN departments ON courses.department_id = departments.id";

const SELECT_STUDENT: &str = "SELECT students.id, students.user_id, students.roll_no, \
     students.date_of_birth, students.admission_year, students.phone, students.address, \
     students.gender, students.department_id, students.course_id, students.created_at, \
     users.name AS student_name, users.email, \
     departments.dept_name AS department_name, courses.course_name \
     FROM students \
     JOIN users ON students.user_id = users.id \
     LEFT JOIN departments ON students.department_id = departments.id \
     LEFT JOIN courses ON students.course_id = courses.id";

const SELECT_FACULTY: &str = "SELECT faculty.id, faculty.user_id, faculty.faculty_code, \
     faculty.phone, faculty.joining_date, faculty.department_id, faculty.created_at, \
     users.name AS faculty_name, users.email, \
     departments.dept_code, departments.dept_name \
     FROM faculty \
     JOIN users ON faculty.user_id = users.id \
     LEFT JOIN departments ON faculty.department_id = departments.id";

const SELECT_SUBJECT: &str = "SELECT subjects.id, subjects.subject_name, subjects.subject_code, \
     subjects.credits, subjects.course_id, subjects.faculty_id, subjects.created_at, \
     courses.course_name, courses.course_code, \
     users.name AS faculty_name, users.email AS faculty_email \
     FROM subjects \
     LEFT JOIN courses ON subjects.course_id = courses.id \
     LEFT JOIN faculty ON subjects.faculty_id = faculty.id \
     LEFT JOIN users ON faculty.user_id = users.id";

const SELECT_ATTENDANCE: &str = "SELECT attendance.id AS attendance_id, attendance.student_id, \
     students.roll_no, users.name AS student_name, \
     attendance.subject_id, subjects.subject_name, subjects.subject_code, \
     attendance.date, attendance.status \
     FROM attendance \
     JOIN students ON attendance.student_id = students.id \
     JOIN users ON students.user_id = users.id \
     JOIN subjects ON attendance.subject_id = subjects.id";

const SELECT_MARKS: &str = "SELECT marks.id AS marks_id, marks.student_id, \
     students.roll_no, users.name AS student_name, \
     marks.subject_id, subjects.subject_name, subjects.subject_code, \
     marks.internal_marks, marks.external_marks \
     FROM marks \
     JOIN students ON marks.student_id = students.id \
     JOIN users ON students.user_id = users.id \
     JOIN subjects ON marks.subject_id = subjects.id";

//=========================================================================================
// `RecordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordStore for PgStore {
    // --- Users and Auth ---

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserCredentialsRecord>(
            "SELECT id, name, email, password, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("User", e))?;
        record.to_domain()
    }

    async fn create_user(&self, user: NewUser) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("User", e))
    }

    async fn list_users(&self) -> PortResult<Vec<UserAccount>> {
        let records = sqlx::query_as::<_, UserAccountRecord>(
            "SELECT id, name, email, role, created_at FROM users",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("User", e))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    // --- Departments ---

    async fn create_department(&self, dept_code: &str, dept_name: &str) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO departments (dept_code, dept_name) VALUES ($1, $2) RETURNING id",
        )
        .bind(dept_code)
        .bind(dept_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("Department", e))
    }

    async fn list_departments(&self) -> PortResult<Vec<Department>> {
        let records = sqlx::query_as::<_, DepartmentRecord>(
            "SELECT id, dept_code, dept_name, created_at FROM departments",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Department", e))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_department_by_id(&self, department_id: i64) -> PortResult<Department> {
        let record = sqlx::query_as::<_, DepartmentRecord>(
            "SELECT id, dept_code, dept_name, created_at FROM departments WHERE id = $1",
        )
        .bind(department_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("Department", e))?;
        Ok(record.to_domain())
    }

    async fn update_department(
        &self,
        department_id: i64,
        dept_code: &str,
        dept_name: &str,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE departments SET dept_code = $1, dept_name = $2 WHERE id = $3")
            .bind(dept_code)
            .bind(dept_name)
            .bind(department_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("Department", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Department not found".to_string()));
        }
        Ok(())
    }

    async fn delete_department(&self, department_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(department_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("Department", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Department not found".to_string()));
        }
        Ok(())
    }

    // --- Courses ---

    async fn create_course(&self, fields: CourseFields) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO courses (course_code, course_name, duration_years, department_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&fields.course_code)
        .bind(&fields.course_name)
        .bind(fields.duration_years)
        .bind(fields.department_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("Course", e))
    }

    async fn list_courses(&self) -> PortResult<Vec<CourseDetails>> {
        let records = sqlx::query_as::<_, CourseRecord>(SELECT_COURSE)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify("Course", e))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_course_by_id(&self, course_id: i64) -> PortResult<CourseDetails> {
        let record =
            sqlx::query_as::<_, CourseRecord>(&format!("{SELECT_COURSE} WHERE courses.id = $1"))
                .bind(course_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| classify("Course", e))?;
        Ok(record.to_domain())
    }

    async fn update_course(&self, course_id: i64, fields: CourseFields) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE courses SET course_code = $1, course_name = $2, duration_years = $3, \
             department_id = $4 WHERE id = $5",
        )
        .bind(&fields.course_code)
        .bind(&fields.course_name)
        .bind(fields.duration_years)
        .bind(fields.department_id)
        .bind(course_id)
        .execute(&self.pool)
        .await
        .map_err(|e| classify("Course", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Course not found".to_string()));
        }
        Ok(())
    }

    async fn delete_course(&self, course_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("Course", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Course not found".to_string()));
        }
        Ok(())
    }

    // --- Students ---

    async fn create_student(&self, student: NewStudent) -> PortResult<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Student", e))?;

        let user_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.password_hash)
        .bind(Role::Student.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify("Student", e))?;

        let student_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO students (user_id, roll_no, date_of_birth, admission_year, phone, \
             address, gender, department_id, course_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
        )
        .bind(user_id)
        .bind(&student.roll_no)
        .bind(student.date_of_birth)
        .bind(student.admission_year)
        .bind(&student.phone)
        .bind(&student.address)
        .bind(student.gender.map(|g| g.as_str()))
        .bind(student.department_id)
        .bind(student.course_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify("Student", e))?;

        tx.commit().await.map_err(|e| classify("Student", e))?;
        Ok(student_id)
    }

    async fn list_students(&self) -> PortResult<Vec<StudentDetails>> {
        let records = sqlx::query_as::<_, StudentRecord>(SELECT_STUDENT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify("Student", e))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_student_by_id(&self, student_id: i64) -> PortResult<StudentDetails> {
        let record =
            sqlx::query_as::<_, StudentRecord>(&format!("{SELECT_STUDENT} WHERE students.id = $1"))
                .bind(student_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| classify("Student", e))?;
        record.to_domain()
    }

    async fn update_student(&self, student_id: i64, update: StudentUpdate) -> PortResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Student", e))?;

        let user_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify("Student", e))?;

        // Only touch the password column when a replacement hash was supplied.
        match &update.password_hash {
            Some(hash) => {
                sqlx::query("UPDATE users SET name = $1, email = $2, password = $3 WHERE id = $4")
                    .bind(&update.name)
                    .bind(&update.email)
                    .bind(hash)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| classify("Student", e))?;
            }
            None => {
                sqlx::query("UPDATE users SET name = $1, email = $2 WHERE id = $3")
                    .bind(&update.name)
                    .bind(&update.email)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| classify("Student", e))?;
            }
        }

        sqlx::query(
            "UPDATE students SET roll_no = $1, date_of_birth = $2, admission_year = $3, \
             phone = $4, address = $5, gender = $6, department_id = $7, course_id = $8 \
             WHERE id = $9",
        )
        .bind(&update.roll_no)
        .bind(update.date_of_birth)
        .bind(update.admission_year)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(update.gender.map(|g| g.as_str()))
        .bind(update.department_id)
        .bind(update.course_id)
        .bind(student_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("Student", e))?;

        tx.commit().await.map_err(|e| classify("Student", e))?;
        Ok(())
    }

    async fn delete_student(&self, student_id: i64) -> PortResult<()> {
        let user_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify("Student", e))?;

        // Deleting the owning user cascades to the student row and, through it,
        // to the student's attendance and marks.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("Student", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Student not found".to_string()));
        }
        Ok(())
    }

    // --- Faculty ---

    async fn create_faculty(&self, faculty: NewFaculty) -> PortResult<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Faculty", e))?;

        let user_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&faculty.name)
        .bind(&faculty.email)
        .bind(&faculty.password_hash)
        .bind(Role::Faculty.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify("Faculty", e))?;

        let faculty_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO faculty (user_id, department_id, faculty_code, phone, joining_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(user_id)
        .bind(faculty.department_id)
        .bind(&faculty.faculty_code)
        .bind(&faculty.phone)
        .bind(faculty.joining_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| classify("Faculty", e))?;

        tx.commit().await.map_err(|e| classify("Faculty", e))?;
        Ok(faculty_id)
    }

    async fn list_faculty(&self) -> PortResult<Vec<FacultyDetails>> {
        let records = sqlx::query_as::<_, FacultyRecord>(SELECT_FACULTY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify("Faculty", e))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_faculty_by_id(&self, faculty_id: i64) -> PortResult<FacultyDetails> {
        let record =
            sqlx::query_as::<_, FacultyRecord>(&format!("{SELECT_FACULTY} WHERE faculty.id = $1"))
                .bind(faculty_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| classify("Faculty", e))?;
        Ok(record.to_domain())
    }

    async fn update_faculty(&self, faculty_id: i64, update: FacultyUpdate) -> PortResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify("Faculty", e))?;

        let user_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM faculty WHERE id = $1")
            .bind(faculty_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify("Faculty", e))?;

        match &update.password_hash {
            Some(hash) => {
                sqlx::query("UPDATE users SET name = $1, email = $2, password = $3 WHERE id = $4")
                    .bind(&update.name)
                    .bind(&update.email)
                    .bind(hash)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| classify("Faculty", e))?;
            }
            None => {
                sqlx::query("UPDATE users SET name = $1, email = $2 WHERE id = $3")
                    .bind(&update.name)
                    .bind(&update.email)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| classify("Faculty", e))?;
            }
        }

        sqlx::query(
            "UPDATE faculty SET department_id = $1, faculty_code = $2, phone = $3, \
             joining_date = $4 WHERE id = $5",
        )
        .bind(update.department_id)
        .bind(&update.faculty_code)
        .bind(&update.phone)
        .bind(update.joining_date)
        .bind(faculty_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| classify("Faculty", e))?;

        tx.commit().await.map_err(|e| classify("Faculty", e))?;
        Ok(())
    }

    async fn delete_faculty(&self, faculty_id: i64) -> PortResult<()> {
        let user_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM faculty WHERE id = $1")
            .bind(faculty_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify("Faculty", e))?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("Faculty", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Faculty not found".to_string()));
        }
        Ok(())
    }

    // --- Subjects ---

    async fn create_subject(&self, subject: NewSubject) -> PortResult<i64> {
        let course = sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = $1")
            .bind(subject.course_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify("Subject", e))?;
        if course.is_none() {
            return Err(PortError::NotFound(format!(
                "Course {} not found",
                subject.course_id
            )));
        }

        sqlx::query_scalar::<_, i64>(
            "INSERT INTO subjects (subject_name, subject_code, course_id, credits) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&subject.subject_name)
        .bind(&subject.subject_code)
        .bind(subject.course_id)
        .bind(subject.credits)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("Subject", e))
    }

    async fn list_subjects(&self) -> PortResult<Vec<SubjectDetails>> {
        let records = sqlx::query_as::<_, SubjectRecord>(SELECT_SUBJECT)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify("Subject", e))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_subject_by_id(&self, subject_id: i64) -> PortResult<SubjectDetails> {
        let record =
            sqlx::query_as::<_, SubjectRecord>(&format!("{SELECT_SUBJECT} WHERE subjects.id = $1"))
                .bind(subject_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| classify("Subject", e))?;
        Ok(record.to_domain())
    }

    async fn update_subject(&self, subject_id: i64, update: SubjectUpdate) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE subjects SET subject_name = $1, subject_code = $2, course_id = $3, \
             credits = $4, faculty_id = $5 WHERE id = $6",
        )
        .bind(&update.subject_name)
        .bind(&update.subject_code)
        .bind(update.course_id)
        .bind(update.credits)
        .bind(update.faculty_id)
        .bind(subject_id)
        .execute(&self.pool)
        .await
        .map_err(|e| classify("Subject", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Subject not found".to_string()));
        }
        Ok(())
    }

    async fn assign_faculty(&self, subject_id: i64, faculty_id: i64) -> PortResult<()> {
        let subject = sqlx::query_scalar::<_, i64>("SELECT id FROM subjects WHERE id = $1")
            .bind(subject_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify("Subject", e))?;
        if subject.is_none() {
            return Err(PortError::NotFound("Subject not found".to_string()));
        }

        let faculty = sqlx::query_scalar::<_, i64>("SELECT id FROM faculty WHERE id = $1")
            .bind(faculty_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify("Faculty", e))?;
        if faculty.is_none() {
            return Err(PortError::NotFound("Faculty not found".to_string()));
        }

        sqlx::query("UPDATE subjects SET faculty_id = $1 WHERE id = $2")
            .bind(faculty_id)
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("Subject", e))?;
        Ok(())
    }

    async fn delete_subject(&self, subject_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("Subject", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Subject not found".to_string()));
        }
        Ok(())
    }

    // --- Attendance ---

    async fn record_attendance(&self, attendance: NewAttendance) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO attendance (student_id, subject_id, date, status) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(attendance.student_id)
        .bind(attendance.subject_id)
        .bind(attendance.date)
        .bind(attendance.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("Attendance record", e))
    }

    async fn attendance_for_student(&self, student_id: i64) -> PortResult<Vec<AttendanceRow>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "{SELECT_ATTENDANCE} WHERE attendance.student_id = $1"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Attendance record", e))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn attendance_for_subject(&self, subject_id: i64) -> PortResult<Vec<AttendanceRow>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "{SELECT_ATTENDANCE} WHERE attendance.subject_id = $1"
        ))
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Attendance record", e))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_attendance(&self) -> PortResult<Vec<AttendanceRow>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "{SELECT_ATTENDANCE} ORDER BY attendance.date DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Attendance record", e))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn delete_attendance(&self, attendance_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(attendance_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("Attendance record", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Attendance record not found".to_string()));
        }
        Ok(())
    }

    // --- Marks ---

    async fn record_marks(&self, marks: NewMarks) -> PortResult<i64> {
        // Explicit duplicate pre-check so the caller gets a directed message;
        // the unique constraint below backstops concurrent inserts.
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM marks WHERE student_id = $1 AND subject_id = $2",
        )
        .bind(marks.student_id)
        .bind(marks.subject_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify("Marks record", e))?;
        if existing.is_some() {
            return Err(PortError::Conflict(
                "Marks already exist for this student in this subject. Please use update instead."
                    .to_string(),
            ));
        }

        sqlx::query_scalar::<_, i64>(
            "INSERT INTO marks (student_id, subject_id, internal_marks, external_marks) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(marks.student_id)
        .bind(marks.subject_id)
        .bind(marks.internal_marks)
        .bind(marks.external_marks)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify("Marks record", e))
    }

    async fn update_marks(
        &self,
        marks_id: i64,
        internal_marks: Option<Decimal>,
        external_marks: Option<Decimal>,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE marks SET internal_marks = $1, external_marks = $2 WHERE id = $3",
        )
        .bind(internal_marks)
        .bind(external_marks)
        .bind(marks_id)
        .execute(&self.pool)
        .await
        .map_err(|e| classify("Marks record", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Marks record not found".to_string()));
        }
        Ok(())
    }

    async fn marks_for_student(&self, student_id: i64) -> PortResult<Vec<MarksRow>> {
        let records = sqlx::query_as::<_, MarksRecord>(&format!(
            "{SELECT_MARKS} WHERE marks.student_id = $1"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Marks record", e))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn marks_for_subject(&self, subject_id: i64) -> PortResult<Vec<MarksRow>> {
        let records = sqlx::query_as::<_, MarksRecord>(&format!(
            "{SELECT_MARKS} WHERE marks.subject_id = $1"
        ))
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| classify("Marks record", e))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_marks(&self) -> PortResult<Vec<MarksRow>> {
        let records = sqlx::query_as::<_, MarksRecord>(SELECT_MARKS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify("Marks record", e))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_marks(&self, marks_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM marks WHERE id = $1")
            .bind(marks_id)
            .execute(&self.pool)
            .await
            .map_err(|e| classify("Marks record", e))?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound("Marks record not found".to_string()));
        }
        Ok(())
    }
}
