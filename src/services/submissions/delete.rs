use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubmissionService, load_submission_context};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn delete_submission(
    service: &SubmissionService,
    submission_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;
    let ctx = try_response!(load_submission_context(storage.as_ref(), submission_id).await);

    // 管理员可删除任意提交；提交者本人只能在批改前删除
    if !user.is_admin() {
        if ctx.submission.student_id != user.id {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "No permission to delete this submission",
            )));
        }
        if ctx.submission.is_graded() {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::SubmissionAlreadyGraded,
                "Graded submissions cannot be deleted",
            )));
        }
    }

    match storage.delete_submission(submission_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Submission deleted successfully",
        ))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "Submission not found",
        ))),
        Err(e) => Ok(internal_error("Failed to delete submission", e)),
    }
}
