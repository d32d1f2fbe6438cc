use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_course_assignment};
use crate::errors::LmsError;
use crate::models::{ApiResponse, ErrorCode, assignments::requests::SubmitAssignmentRequest};
use crate::services::files::check_file_references;
use crate::services::{course_access, current_user, internal_error};
use crate::try_response;

pub async fn submit_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    submission: SubmitAssignmentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let access = try_response!(course_access(request));

    // 只有有效选课的学生可以提交
    if !access.is_enrolled_student() {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::NotEnrolled,
            "Only enrolled students can submit assignments",
        )));
    }

    if let Err(msg) = submission.validate() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::BadRequest, msg)));
    }

    let storage = service.get_storage(request)?;
    let assignment = try_response!(
        load_course_assignment(storage.as_ref(), access.course.id, assignment_id).await
    );

    try_response!(
        check_file_references(
            storage.as_ref(),
            &user,
            access.course.id,
            false,
            submission.attachments.iter().flatten().map(String::as_str),
        )
        .await
    );

    // 逾期提交照常接收，并标记 is_late
    match storage
        .create_submission(&assignment, user.id, submission)
        .await
    {
        Ok(created) => {
            tracing::info!(
                "Student {} submitted assignment {} (late: {})",
                user.id,
                assignment.id,
                created.is_late
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                created,
                "Assignment submitted successfully",
            )))
        }
        Err(LmsError::Conflict(_)) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::SubmissionAlreadyExists,
            "You have already submitted this assignment",
        ))),
        Err(e) => Ok(internal_error("Failed to create submission", e)),
    }
}
