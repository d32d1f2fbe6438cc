use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::models::{ApiResponse, ErrorCode, enrollments::requests::UpdateProgressRequest};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn update_progress(
    service: &EnrollmentService,
    course_id: i64,
    progress: UpdateProgressRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    // 进度截断到 [0, 100]，达到 100 时记录完成时间
    match storage
        .update_enrollment_progress(user.id, course_id, progress.progress)
        .await
    {
        Ok(Some(enrollment)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            enrollment,
            "Progress updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotEnrolled,
            "Not enrolled in this course",
        ))),
        Err(e) => Ok(internal_error("Failed to update progress", e)),
    }
}
