use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::models::ApiResponse;
use crate::services::{internal_error, require_course_manager};
use crate::try_response;

pub async fn list_students(
    service: &EnrollmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let access = try_response!(require_course_manager(request));
    let storage = service.get_storage(request)?;

    match storage.list_course_students(access.course.id).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            students,
            "Course students retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list course students", e)),
    }
}
