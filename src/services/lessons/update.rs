use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::LessonService;
use crate::models::{ApiResponse, ErrorCode, lessons::requests::UpdateLessonRequest};
use crate::services::files::check_file_references;
use crate::services::{current_user, internal_error, require_course_manager};
use crate::try_response;

pub async fn update_lesson(
    service: &LessonService,
    lesson_id: i64,
    update_data: UpdateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let access = try_response!(require_course_manager(request));

    if let Err(msg) = update_data.validate() {
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
            update_data
                .video_url
                .iter()
                .chain(update_data.attachments.iter().flatten())
                .map(String::as_str),
        )
        .await
    );

    match storage
        .update_lesson(access.course.id, lesson_id, update_data)
        .await
    {
        Ok(Some(lesson)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            lesson,
            "Lesson updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::LessonNotFound,
            "Lesson not found",
        ))),
        Err(e) => Ok(internal_error("Failed to update lesson", e)),
    }
}
