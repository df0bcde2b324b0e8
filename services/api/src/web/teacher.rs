//! services/api/src/web/teacher.rs
//!
//! Handlers for the teacher dashboard: roster management, result review,
//! manual classcard entries, and guardian reports.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::info;
use tutor_core::{
    ledger::summarize, report::generate_report, AttemptDetail, AttemptRecord, ClasscardScores,
    Principal, Student,
};

use crate::web::{
    port_error,
    protocol::{CreateStudentRequest, ReportResponse, StudentResults},
    state::AppState,
};

type HandlerResult<T> = Result<T, (StatusCode, String)>;

/// GET /teacher/students - Every registered student, credentials included
pub async fn list_students_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<Student>>> {
    let students = state.roster.list().await.map_err(port_error)?;
    Ok(Json(students))
}

/// POST /teacher/students - Register a new student
#[utoipa::path(
    post,
    path = "/teacher/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student registered"),
        (status = 400, description = "Missing field or duplicate student number"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not the teacher")
    )
)]
pub async fn create_student_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStudentRequest>,
) -> HandlerResult<impl IntoResponse> {
    let student = state.roster.create(req.into()).await.map_err(port_error)?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// DELETE /teacher/students/{id} - Remove a student; their results stay behind
///
/// A grade already in flight for this student still lands in the ledger and
/// is returned to the student from the detached grading job.
pub async fn delete_student_handler(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> HandlerResult<StatusCode> {
    state.roster.delete(&student_id).await.map_err(port_error)?;
    state
        .exercises
        .lock()
        .await
        .retain(|(owner, _), _| owner != &student_id);
    state.login_sessions.write().await.retain(|_, principal| {
        !matches!(principal, Principal::Student { student_id: id } if id == &student_id)
    });
    Ok(StatusCode::NO_CONTENT)
}

/// GET /teacher/students/{id}/results - Full history plus aggregates
pub async fn student_results_handler(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> HandlerResult<Json<StudentResults>> {
    let student = state.roster.get(&student_id).await.map_err(port_error)?;
    let records = state.ledger.records(&student_id).await.map_err(port_error)?;
    let summary = summarize(&records);
    Ok(Json(StudentResults {
        student,
        records,
        summary,
    }))
}

/// POST /teacher/students/{id}/classcard - Append scores typed in from the drilling product
pub async fn save_classcard_handler(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
    Json(scores): Json<ClasscardScores>,
) -> HandlerResult<impl IntoResponse> {
    state.roster.get(&student_id).await.map_err(port_error)?;
    let record = AttemptRecord::today(AttemptDetail::Classcard(scores));
    state
        .ledger
        .append(&student_id, record.clone())
        .await
        .map_err(port_error)?;
    info!("Saved classcard scores for student {}", student_id);
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /teacher/students/{id}/report - Write a guardian report from the latest results
pub async fn report_handler(
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<String>,
) -> HandlerResult<Json<ReportResponse>> {
    let student = state.roster.get(&student_id).await.map_err(port_error)?;
    let records = state.ledger.records(&student_id).await.map_err(port_error)?;
    let report = generate_report(state.model.as_ref(), &student, &records)
        .await
        .map_err(port_error)?;
    Ok(Json(ReportResponse { report }))
}
