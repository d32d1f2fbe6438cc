use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubmissionService, load_submission_context};
use crate::errors::LmsError;
use crate::models::{
    ApiResponse, ErrorCode,
    submissions::{entities::validate_score, requests::GradeSubmissionRequest},
};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn grade_submission(
    service: &SubmissionService,
    submission_id: i64,
    grade: GradeSubmissionRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;
    let ctx = try_response!(load_submission_context(storage.as_ref(), submission_id).await);

    // 课程教师或管理员
    if !ctx.course.can_be_managed_by(&user) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "Only the course teacher or an admin can grade submissions",
        )));
    }

    if let Err(msg) = validate_score(grade.score, ctx.assignment.max_score) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ScoreOutOfRange, msg)));
    }

    match storage
        .grade_submission(submission_id, grade.score, grade.feedback, user.id)
        .await
    {
        Ok(Some(submission)) => {
            tracing::info!(
                "Submission {} graded {} by user {}",
                submission_id,
                grade.score,
                user.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                submission,
                "Submission graded successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::SubmissionNotFound,
            "Submission not found",
        ))),
        // 读取后满分被修改
        Err(LmsError::Validation(msg)) => Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ScoreOutOfRange, msg))),
        Err(e) => Ok(internal_error("Failed to grade submission", e)),
    }
}
