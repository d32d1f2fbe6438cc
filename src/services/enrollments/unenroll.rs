use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn unenroll(
    service: &EnrollmentService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    // 软删除，保留进度
    match storage.unenroll_student(user.id, course_id).await {
        Ok(true) => {
            tracing::info!("Student {} unenrolled from course {}", user.id, course_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Unenrolled successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::EnrollmentNotFound,
            "Enrollment not found",
        ))),
        Err(e) => Ok(internal_error("Failed to unenroll", e)),
    }
}
