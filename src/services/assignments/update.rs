use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_course_assignment};
use crate::models::{ApiResponse, ErrorCode, assignments::requests::UpdateAssignmentRequest};
use crate::services::files::check_file_references;
use crate::services::{current_user, internal_error, require_course_manager};
use crate::try_response;

pub async fn update_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    update_data: UpdateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let access = try_response!(require_course_manager(request));

    if let Err(msg) = update_data.validate() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::AssignmentInvalid, msg)));
    }

    let storage = service.get_storage(request)?;
    try_response!(
        load_course_assignment(storage.as_ref(), access.course.id, assignment_id).await
    );
    try_response!(
        check_file_references(
            storage.as_ref(),
            &user,
            access.course.id,
            access.can_manage(),
            update_data.attachments.iter().flatten().map(String::as_str),
        )
        .await
    );

    match storage.update_assignment(assignment_id, update_data).await {
        Ok(Some(assignment)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            assignment,
            "Assignment updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::AssignmentNotFound,
            "Assignment not found",
        ))),
        Err(e) => Ok(internal_error("Failed to update assignment", e)),
    }
}
