use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{ApiResponse, ErrorCode, courses::requests::CourseApprovalRequest};
use crate::services::internal_error;

pub async fn set_approval(
    service: &CourseService,
    course_id: i64,
    approval: CourseApprovalRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage
        .set_course_approval(course_id, approval.is_approved)
        .await
    {
        Ok(Some(course)) => {
            tracing::info!(
                "Course {} approval set to {}",
                course_id,
                approval.is_approved
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                course,
                "Course approval updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(e) => Ok(internal_error("Failed to update course approval", e)),
    }
}
