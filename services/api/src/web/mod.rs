pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod student;
pub mod teacher;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tracing::{error, warn};
use tutor_core::PortError;

use crate::web::{
    auth::{logout_handler, student_login_handler, teacher_login_handler},
    middleware::{require_student, require_teacher},
    state::AppState,
    student::{
        answer_handler, generate_handler, get_exercise_handler, grade_handler, me_handler,
        reset_handler, summary_handler,
    },
    teacher::{
        create_student_handler, delete_student_handler, list_students_handler, report_handler,
        save_classcard_handler, student_results_handler,
    },
};

/// Maps a port failure to the status code and message returned to the client.
pub fn port_error(e: PortError) -> (StatusCode, String) {
    let status = match &e {
        PortError::Validation(_) => StatusCode::BAD_REQUEST,
        PortError::ModelTransport(_) | PortError::ModelResponse(_) => StatusCode::BAD_GATEWAY,
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Unauthorized => StatusCode::UNAUTHORIZED,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", e);
    } else if status == StatusCode::BAD_REQUEST {
        warn!("Request rejected: {}", e);
    }
    (status, e.to_string())
}

/// Builds every API route. CORS, tracing and Swagger UI are layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/student/login", post(student_login_handler))
        .route("/auth/teacher/login", post(teacher_login_handler))
        .route("/auth/logout", post(logout_handler));

    let student_routes = Router::new()
        .route("/me", get(me_handler))
        .route("/me/summary", get(summary_handler))
        .route(
            "/exercises/{kind}",
            get(get_exercise_handler)
                .post(generate_handler)
                .delete(reset_handler),
        )
        .route("/exercises/{kind}/answers/{index}", put(answer_handler))
        .route("/exercises/{kind}/grade", post(grade_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_student,
        ));

    let teacher_routes = Router::new()
        .route(
            "/teacher/students",
            get(list_students_handler).post(create_student_handler),
        )
        .route(
            "/teacher/students/{id}",
            axum::routing::delete(delete_student_handler),
        )
        .route("/teacher/students/{id}/results", get(student_results_handler))
        .route("/teacher/students/{id}/classcard", post(save_classcard_handler))
        .route("/teacher/students/{id}/report", post(report_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_teacher,
        ));

    Router::new()
        .merge(public_routes)
        .merge(student_routes)
        .merge(teacher_routes)
        .with_state(app_state)
}
