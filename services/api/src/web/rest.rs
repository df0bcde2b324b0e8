//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::web::{
    auth::{
        __path_logout_handler, __path_student_login_handler, __path_teacher_login_handler,
    },
    protocol::{
        CreateStudentRequest, StudentLoginRequest, StudentProfile, TeacherLoginRequest,
        TeacherSession,
    },
    teacher::__path_create_student_handler,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        student_login_handler,
        teacher_login_handler,
        logout_handler,
        create_student_handler,
    ),
    components(
        schemas(
            StudentLoginRequest,
            TeacherLoginRequest,
            StudentProfile,
            TeacherSession,
            CreateStudentRequest
        )
    ),
    tags(
        (name = "English Tutor API", description = "Login, roster management and exercise endpoints for the tutoring service.")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_login_and_roster_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/student/login",
            "/auth/teacher/login",
            "/auth/logout",
            "/teacher/students",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
