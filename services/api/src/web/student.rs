//! services/api/src/web/student.rs
//!
//! Handlers for the student-facing routes: profile, progress summary, and the
//! generate → answer → grade cycle of the three exercise generators.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use tutor_core::{
    domain::{EssayParams, ExamParams, ExerciseKind, ReadingParams},
    exercise::ExerciseSession,
    GenerationRequest, LedgerSummary, PortError,
};

use crate::web::{
    middleware::StudentId,
    port_error,
    protocol::{AnswerRequest, GradeRequest, StudentProfile},
    state::AppState,
};

type HandlerResult<T> = Result<T, (StatusCode, String)>;

//=========================================================================================
// Profile and Progress
//=========================================================================================

/// GET /me - The logged-in student's profile
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
) -> HandlerResult<Json<StudentProfile>> {
    let student = state.roster.get(&student_id).await.map_err(port_error)?;
    Ok(Json(StudentProfile::from(&student)))
}

/// GET /me/summary - Per-kind averages and the five newest records
pub async fn summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
) -> HandlerResult<Json<LedgerSummary>> {
    let summary = state.ledger.summary(&student_id).await.map_err(port_error)?;
    Ok(Json(summary))
}

//=========================================================================================
// Generation
//=========================================================================================

/// POST /exercises/{kind} - Generate a reading set, essay topic or exam drill
///
/// The body carries the parameters for the generator named by `kind`.
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
    Path(kind): Path<ExerciseKind>,
    Json(body): Json<Value>,
) -> HandlerResult<Json<ExerciseSession>> {
    let request = match kind {
        ExerciseKind::Reading => {
            serde_json::from_value::<ReadingParams>(body).map(GenerationRequest::Reading)
        }
        ExerciseKind::Essay => {
            serde_json::from_value::<EssayParams>(body).map(GenerationRequest::Essay)
        }
        ExerciseKind::Exam => serde_json::from_value::<ExamParams>(body).map(GenerationRequest::Exam),
    }
    .map_err(|e| port_error(PortError::Validation(format!("Invalid {:?} options: {}", kind, e))))?;
    generate(&state, &student_id, request).await
}

/// Moves the session to `Generating`, calls the model with the lock released,
/// then settles the session with whatever came back.
async fn generate(
    state: &AppState,
    student_id: &str,
    request: GenerationRequest,
) -> HandlerResult<Json<ExerciseSession>> {
    let student = state.roster.get(student_id).await.map_err(port_error)?;
    let key = (student_id.to_string(), request.kind());

    {
        let mut sessions = state.exercises.lock().await;
        let session = sessions
            .entry(key.clone())
            .or_insert_with(|| ExerciseSession::new(request.kind(), student.grade));
        session.grade = student.grade;
        session.begin_generation(&request).map_err(port_error)?;
    }

    let result = request.generate(state.model.as_ref(), student.grade).await;

    let mut sessions = state.exercises.lock().await;
    let session = sessions.get_mut(&key).ok_or_else(|| {
        port_error(PortError::Unexpected(
            "exercise session vanished during generation".to_string(),
        ))
    })?;
    session.finish_generation(result).map_err(|e| {
        error!("Generation failed for student {}: {}", student_id, e);
        port_error(e)
    })?;
    info!("Generated {:?} exercise for student {}", key.1, student_id);
    Ok(Json(session.clone()))
}

//=========================================================================================
// Answering, Grading and Reset
//=========================================================================================

/// GET /exercises/{kind} - The current session (an idle one if none exists)
pub async fn get_exercise_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
    Path(kind): Path<ExerciseKind>,
) -> HandlerResult<Json<ExerciseSession>> {
    let existing = state
        .exercises
        .lock()
        .await
        .get(&(student_id.clone(), kind))
        .cloned();
    match existing {
        Some(session) => Ok(Json(session)),
        None => {
            let student = state.roster.get(&student_id).await.map_err(port_error)?;
            Ok(Json(ExerciseSession::new(kind, student.grade)))
        }
    }
}

/// PUT /exercises/{kind}/answers/{index} - Record one answer
///
/// For essays the whole essay text is slot 0.
pub async fn answer_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
    Path((kind, index)): Path<(ExerciseKind, usize)>,
    Json(req): Json<AnswerRequest>,
) -> HandlerResult<StatusCode> {
    let mut sessions = state.exercises.lock().await;
    let session = sessions
        .get_mut(&(student_id, kind))
        .ok_or_else(no_exercise)?;
    session.record_answer(index, req.answer).map_err(port_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /exercises/{kind}/grade - Grade the session and record the result
pub async fn grade_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
    Path(kind): Path<ExerciseKind>,
    Json(req): Json<GradeRequest>,
) -> HandlerResult<Json<ExerciseSession>> {
    let key = (student_id.clone(), kind);
    let job = {
        let mut sessions = state.exercises.lock().await;
        let session = sessions.get_mut(&key).ok_or_else(no_exercise)?;
        session.begin_grading().map_err(port_error)?
    };

    let result = job
        .grade_and_record(
            state.model.as_ref(),
            &state.ledger,
            &student_id,
            req.feedback_level,
        )
        .await;

    // Any ledger write has already happened; if the session was dropped
    // meanwhile (student deleted), report the outcome from the job itself.
    let mut sessions = state.exercises.lock().await;
    let mut detached;
    let session = match sessions.get_mut(&key) {
        Some(session) => session,
        None => {
            warn!("Exercise session for {} was dropped during grading", student_id);
            detached = job.detached_session();
            &mut detached
        }
    };
    session.finish_grading(result).map_err(|e| {
        error!("Grading failed for student {}: {}", student_id, e);
        port_error(e)
    })?;
    Ok(Json(session.clone()))
}

/// DELETE /exercises/{kind} - Discard the exercise
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Extension(StudentId(student_id)): Extension<StudentId>,
    Path(kind): Path<ExerciseKind>,
) -> HandlerResult<impl IntoResponse> {
    let mut sessions = state.exercises.lock().await;
    if let Some(session) = sessions.get_mut(&(student_id, kind)) {
        session.reset().map_err(port_error)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

fn no_exercise() -> (StatusCode, String) {
    port_error(PortError::Validation(
        "Generate an exercise first.".to_string(),
    ))
}
