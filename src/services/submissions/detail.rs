use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{SubmissionService, load_submission_context};
use crate::models::{ApiResponse, ErrorCode, submissions::responses::SubmissionWithAssignment};
use crate::services::current_user;
use crate::try_response;

pub async fn get_submission(
    service: &SubmissionService,
    submission_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;
    let ctx = try_response!(load_submission_context(storage.as_ref(), submission_id).await);

    // 提交者本人、课程教师或管理员
    if ctx.submission.student_id != user.id && !ctx.course.can_be_managed_by(&user) {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "No permission to view this submission",
        )));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SubmissionWithAssignment {
            submission: ctx.submission,
            assignment_title: ctx.assignment.title,
            course_id: ctx.course.id,
            max_score: ctx.assignment.max_score,
        },
        "Submission retrieved successfully",
    )))
}
