//! services/api/src/web/protocol.rs
//!
//! Request and response payloads exchanged between the browser client and the
//! API server. Core types that already have the right JSON shape (students,
//! attempt records, exercise sessions) are sent as-is.

use serde::{Deserialize, Serialize};
use tutor_core::domain::{FeedbackLevel, GradeBand, NewStudent, Student};
use tutor_core::ledger::LedgerSummary;
use tutor_core::AttemptRecord;
use utoipa::ToSchema;

//=========================================================================================
// Auth Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct StudentLoginRequest {
    pub number: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct TeacherLoginRequest {
    pub passphrase: String,
}

/// A student as seen by the student: everything except the password.
#[derive(Serialize, ToSchema)]
pub struct StudentProfile {
    pub id: String,
    pub name: String,
    pub number: String,
    #[schema(value_type = String, example = "el56")]
    pub grade: GradeBand,
    pub grade_label: String,
}

impl From<&Student> for StudentProfile {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.clone(),
            name: student.name.clone(),
            number: student.number.clone(),
            grade: student.grade,
            grade_label: student.grade.label().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TeacherSession {
    pub role: String,
}

//=========================================================================================
// Teacher Payloads
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    pub name: String,
    pub number: String,
    pub password: String,
    #[schema(value_type = String, example = "el56")]
    pub grade: GradeBand,
}

impl From<CreateStudentRequest> for NewStudent {
    fn from(req: CreateStudentRequest) -> Self {
        NewStudent {
            name: req.name,
            number: req.number,
            password: req.password,
            grade: req.grade,
        }
    }
}

#[derive(Serialize)]
pub struct StudentResults {
    pub student: Student,
    pub records: Vec<AttemptRecord>,
    pub summary: LedgerSummary,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub report: String,
}

//=========================================================================================
// Exercise Payloads
//=========================================================================================

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Deserialize, Default)]
pub struct GradeRequest {
    #[serde(default)]
    pub feedback_level: FeedbackLevel,
}
