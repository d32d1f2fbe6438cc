use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_course_assignment};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, require_course_manager};
use crate::try_response;

pub async fn delete_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let access = try_response!(require_course_manager(request));
    let storage = service.get_storage(request)?;
    try_response!(load_course_assignment(storage.as_ref(), access.course.id, assignment_id).await);

    match storage.delete_assignment(assignment_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Assignment deleted successfully",
        ))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        ))),
        Err(e) => Ok(internal_error("Failed to delete assignment", e)),
    }
}
