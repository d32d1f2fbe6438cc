use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LessonService;
use crate::models::{ApiResponse, ErrorCode, lessons::requests::CreateLessonRequest};
use crate::services::files::check_file_references;
use crate::services::{current_user, internal_error, require_course_manager};
use crate::try_response;

pub async fn create_lesson(
    service: &LessonService,
    lesson_data: CreateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let access = try_response!(require_course_manager(request));

    if let Err(msg) = lesson_data.validate() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::LessonInvalid, msg)));
    }

    let storage = service.get_storage(request)?;
    try_response!(
        check_file_references(
            storage.as_ref(),
            &user,
            access.course.id,
            access.can_manage(),
            lesson_data
                .video_url
                .iter()
                .chain(lesson_data.attachments.iter().flatten())
                .map(String::as_str),
        )
        .await
    );

    match storage.create_lesson(access.course.id, lesson_data).await {
        Ok(lesson) => Ok(HttpResponse::Created().json(ApiResponse::success(
            lesson,
            "Lesson created successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to create lesson", e)),
    }
}
