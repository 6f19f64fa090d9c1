pub mod domain;
pub mod ports;

pub use domain::{
    AttendanceRow, AttendanceStatus, AuthClaims, CourseDetails, CourseFields, Department,
    FacultyDetails, FacultyUpdate, Gender, MarksRow, NewAttendance, NewFaculty, NewMarks,
    NewStudent, NewSubject, NewUser, Role, StudentDetails, StudentUpdate, SubjectDetails,
    SubjectUpdate, UserAccount, UserCredentials,
};
pub use ports::{PortError, PortResult, RecordStore, TokenError, TokenService};
