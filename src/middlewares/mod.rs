pub mod rate_limit;
pub mod require_course_access;
pub mod require_jwt;
pub mod require_role;

use actix_web::{HttpResponse, http::StatusCode, http::header::CONTENT_TYPE};

use crate::models::{ApiResponse, ErrorCode};

pub use rate_limit::RateLimit;
pub use require_course_access::{CourseAccess, CourseAccessLevel, RequireCourseAccess};
pub use require_jwt::RequireJWT;
pub use require_role::RequireRole;

/// 中间件统一的错误响应
pub fn create_error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .json(ApiResponse::error_empty(code, message))
}
