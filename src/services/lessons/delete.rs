use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LessonService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{internal_error, require_course_manager};
use crate::try_response;

pub async fn delete_lesson(
    service: &LessonService,
    lesson_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let access = try_response!(require_course_manager(request));
    let storage = service.get_storage(request)?;

    match storage.delete_lesson(access.course.id, lesson_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Lesson deleted successfully",
        ))),
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::LessonNotFound,
            "Lesson not found",
        ))),
        Err(e) => Ok(internal_error("Failed to delete lesson", e)),
    }
}
