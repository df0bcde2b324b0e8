//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for student login, teacher login, and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::warn;
use tutor_core::{PortError, Principal};
use uuid::Uuid;

use crate::web::{
    middleware::{session_id_from_headers, SESSION_COOKIE},
    port_error,
    protocol::{StudentLoginRequest, StudentProfile, TeacherLoginRequest, TeacherSession},
    state::AppState,
};

/// Registers a new login session and returns its `Set-Cookie` value.
async fn open_session(state: &AppState, principal: Principal) -> String {
    let session_id = Uuid::new_v4().to_string();
    state
        .login_sessions
        .write()
        .await
        .insert(session_id.clone(), principal);
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/",
        SESSION_COOKIE, session_id
    )
}

/// Failed credential checks are reported as 401 rather than 400.
fn login_error(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::Validation(message) => (StatusCode::UNAUTHORIZED, message),
        other => port_error(other),
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/student/login - Login with a student number and password
#[utoipa::path(
    post,
    path = "/auth/student/login",
    request_body = StudentLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = StudentProfile),
        (status = 401, description = "Incorrect student number or password"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn student_login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StudentLoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let student = state
        .auth
        .login_student(req.number.trim(), &req.password)
        .await
        .map_err(login_error)?;

    let cookie = open_session(
        &state,
        Principal::Student {
            student_id: student.id.clone(),
        },
    )
    .await;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(StudentProfile::from(&student)),
    ))
}

/// POST /auth/teacher/login - Login with the teacher passphrase
#[utoipa::path(
    post,
    path = "/auth/teacher/login",
    request_body = TeacherLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TeacherSession),
        (status = 401, description = "Incorrect passphrase")
    )
)]
pub async fn teacher_login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TeacherLoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state
        .auth
        .login_teacher(&req.passphrase)
        .map_err(login_error)?;

    let cookie = open_session(&state, Principal::Teacher).await;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(TeacherSession {
            role: "teacher".to_string(),
        }),
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let session_id = session_id_from_headers(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    let removed = state.login_sessions.write().await.remove(session_id);
    if removed.is_none() {
        warn!("Logout for unknown session {}", session_id);
        return Err((StatusCode::UNAUTHORIZED, "No session found".to_string()));
    }

    let cookie = format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    );
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}
