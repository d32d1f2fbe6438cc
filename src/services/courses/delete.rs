use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CourseService, load_managed_course};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn delete_course(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;
    try_response!(load_managed_course(storage.as_ref(), course_id, &user).await);

    // 课时、作业、提交、选课与答疑随外键级联删除
    match storage.delete_course(course_id).await {
        Ok(true) => {
            tracing::info!("Course {} deleted by user {}", course_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Course deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        ))),
        Err(e) => Ok(internal_error("Failed to delete course", e)),
    }
}
