use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LessonService;
use crate::errors::LmsError;
use crate::models::{ApiResponse, ErrorCode, lessons::requests::ReorderLessonsRequest};
use crate::services::{internal_error, require_course_manager};
use crate::try_response;

pub async fn reorder_lessons(
    service: &LessonService,
    reorder: ReorderLessonsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let access = try_response!(require_course_manager(request));
    let storage = service.get_storage(request)?;

    // 新顺序必须是课程全部课时的排列，order_index 依次为 0..n
    match storage
        .reorder_lessons(access.course.id, reorder.lesson_ids)
        .await
    {
        Ok(lessons) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            lessons,
            "Lessons reordered successfully",
        ))),
        Err(LmsError::Validation(msg)) => Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::LessonOrderInvalid, msg))),
        Err(e) => Ok(internal_error("Failed to reorder lessons", e)),
    }
}
