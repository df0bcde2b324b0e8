//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;
use tutor_core::Principal;

use crate::web::state::AppState;

pub const SESSION_COOKIE: &str = "session";

/// The id of the logged-in student, inserted by `require_student`.
#[derive(Clone, Debug)]
pub struct StudentId(pub String);

/// Reads the login session id out of the `Cookie` header.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| {
            c.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|id| !id.is_empty())
}

async fn principal_for(state: &AppState, headers: &HeaderMap) -> Result<Principal, StatusCode> {
    let session_id = session_id_from_headers(headers).ok_or(StatusCode::UNAUTHORIZED)?;
    state
        .login_sessions
        .read()
        .await
        .get(session_id)
        .cloned()
        .ok_or(StatusCode::UNAUTHORIZED)
}

/// Lets the request through only for a logged-in student.
///
/// The student's id is inserted into the request extensions as `StudentId`.
pub async fn require_student(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let principal = principal_for(&state, req.headers()).await?;
    match principal {
        Principal::Student { student_id } => {
            req.extensions_mut().insert(StudentId(student_id));
            Ok(next.run(req).await)
        }
        Principal::Teacher => {
            warn!("Teacher session used on a student route: {}", req.uri());
            Err(StatusCode::FORBIDDEN)
        }
    }
}

/// Lets the request through only for the teacher.
pub async fn require_teacher(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let principal = principal_for(&state, req.headers()).await?;
    match principal {
        Principal::Teacher => Ok(next.run(req).await),
        Principal::Student { student_id } => {
            warn!("Student {} tried a teacher route: {}", student_id, req.uri());
            Err(StatusCode::FORBIDDEN)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn finds_session_among_other_cookies() {
        let headers = with_cookie("theme=dark; session=abc-123; lang=ko");
        assert_eq!(session_id_from_headers(&headers), Some("abc-123"));
    }

    #[test]
    fn ignores_lookalike_cookie_names() {
        let headers = with_cookie("sessionid=nope");
        assert_eq!(session_id_from_headers(&headers), None);
    }

    #[test]
    fn empty_session_value_is_missing() {
        assert_eq!(session_id_from_headers(&with_cookie("session=")), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }
}
