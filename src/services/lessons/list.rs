use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LessonService;
use crate::models::ApiResponse;
use crate::services::{course_access, internal_error};
use crate::try_response;

pub async fn list_lessons(
    service: &LessonService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let access = try_response!(course_access(request));
    let storage = service.get_storage(request)?;

    match storage.list_lessons_by_course(access.course.id).await {
        Ok(lessons) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            lessons,
            "Lessons retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list lessons", e)),
    }
}
