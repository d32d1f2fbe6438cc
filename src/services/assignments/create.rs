use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::{ApiResponse, ErrorCode, assignments::requests::CreateAssignmentRequest};
use crate::services::files::check_file_references;
use crate::services::{current_user, internal_error, require_course_manager};
use crate::try_response;

pub async fn create_assignment(
    service: &AssignmentService,
    assignment_data: CreateAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let access = try_response!(require_course_manager(request));

    if let Err(msg) = assignment_data.validate() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::AssignmentInvalid, msg)));
    }

    let storage = service.get_storage(request)?;
    try_response!(
        check_file_references(
            storage.as_ref(),
            &user,
            access.course.id,
            access.can_manage(),
            assignment_data
                .attachments
                .iter()
                .flatten()
                .map(String::as_str),
        )
        .await
    );

    match storage
        .create_assignment(access.course.id, assignment_data)
        .await
    {
        Ok(assignment) => Ok(HttpResponse::Created().json(ApiResponse::success(
            assignment,
            "Assignment created successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to create assignment", e)),
    }
}
