use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::models::{ApiResponse, enrollments::responses::EnrollmentStatusResponse};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn get_status(
    service: &EnrollmentService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    match storage.get_enrollment(user.id, course_id).await {
        Ok(enrollment) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            EnrollmentStatusResponse {
                is_enrolled: enrollment.as_ref().is_some_and(|e| e.is_active),
                enrollment,
            },
            "Enrollment status retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to get enrollment status", e)),
    }
}
