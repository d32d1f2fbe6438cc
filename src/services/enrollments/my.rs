use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::models::ApiResponse;
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn list_my_enrollments(
    service: &EnrollmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    match storage.list_enrollments_by_student(user.id).await {
        Ok(enrollments) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            enrollments,
            "Enrollments retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list enrollments", e)),
    }
}
