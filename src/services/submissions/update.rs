use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubmissionService, load_submission_context};
use crate::errors::LmsError;
use crate::models::{ApiResponse, ErrorCode, submissions::requests::UpdateSubmissionRequest};
use crate::services::files::check_file_references;
use crate::services::{current_user, internal_error};
use crate::try_response;

fn already_graded() -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::SubmissionAlreadyGraded,
        "Graded submissions cannot be modified",
    ))
}

pub async fn update_submission(
    service: &SubmissionService,
    submission_id: i64,
    update_data: UpdateSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;
    let ctx = try_response!(load_submission_context(storage.as_ref(), submission_id).await);

    // 只有提交者本人可以修改
    if ctx.submission.student_id != user.id {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "Only the submitter can modify this submission",
        )));
    }
    if ctx.submission.is_graded() {
        return Ok(already_graded());
    }
    try_response!(
        check_file_references(
            storage.as_ref(),
            &user,
            ctx.course.id,
            false,
            update_data.attachments.iter().flatten().map(String::as_str),
        )
        .await
    );

    match storage.update_submission(submission_id, update_data).await {
        Ok(Some(submission)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            submission,
            "Submission updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "Submission not found",
        ))),
        // 读取后被批改
        Err(LmsError::Conflict(_)) => Ok(already_graded()),
        Err(e) => Ok(internal_error("Failed to update submission", e)),
    }
}
