use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::{ApiResponse, submissions::requests::MySubmissionsQuery};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn list_my_submissions(
    service: &SubmissionService,
    query: MySubmissionsQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    match storage
        .list_submissions_by_student(user.id, query.course_id)
        .await
    {
        Ok(submissions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            submissions,
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list my submissions", e)),
    }
}
