pub mod assignments;
pub mod auth;
pub mod consultations;
pub mod courses;
pub mod enrollments;
pub mod files;
pub mod lessons;
pub mod statistics;
pub mod submissions;
pub mod users;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use consultations::ConsultationService;
pub use courses::CourseService;
pub use enrollments::EnrollmentService;
pub use files::FileService;
pub use lessons::LessonService;
pub use statistics::StatisticsService;
pub use submissions::SubmissionService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::middlewares::{CourseAccess, RequireCourseAccess, RequireJWT};
use crate::models::{ApiResponse, ErrorCode, users::entities::User};
use crate::storage::Storage;

/// 从 app data 取存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|s| s.get_ref().clone())
        .ok_or_else(|| {
            tracing::error!("Storage not found in app data");
            actix_web::error::ErrorInternalServerError("Internal server error")
        })
}

/// 从 app data 取缓存实例，未注册时返回 None
pub(crate) fn cache_from_request(request: &HttpRequest) -> Option<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|c| c.get_ref().clone())
}

/// 记录内部错误，对外只返回通用信息
pub(crate) fn internal_error(context: &str, err: impl std::fmt::Display) -> HttpResponse {
    tracing::error!("{}: {}", context, err);
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::InternalServerError,
        "Internal server error",
    ))
}

pub(crate) fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::Unauthorized,
        "Unauthorized access, please login",
    ))
}

/// 当前登录用户，未登录时返回 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(unauthorized)
}

/// RequireCourseAccess 放入的课程访问信息
pub(crate) fn course_access(request: &HttpRequest) -> Result<CourseAccess, HttpResponse> {
    RequireCourseAccess::extract_course_access(request).ok_or_else(|| {
        HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "No permission for this course",
        ))
    })
}

/// 仅课程教师本人或管理员
pub(crate) fn require_course_manager(request: &HttpRequest) -> Result<CourseAccess, HttpResponse> {
    let access = course_access(request)?;
    if access.can_manage() {
        Ok(access)
    } else {
        Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "Only the course teacher or an admin can do this",
        )))
    }
}

/// 把 `Result<_, HttpResponse>` 中的错误响应直接返回
#[macro_export]
macro_rules! try_response {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(response) => return Ok(response),
        }
    };
}
