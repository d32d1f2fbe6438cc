use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiResponse, ErrorCode, courses::responses::CourseDetailResponse, users::entities::UserRole,
};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn get_course(
    service: &CourseService,
    course_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to get course", e)),
    };

    let is_enrolled = if user.role == UserRole::Student {
        match storage.get_enrollment(user.id, course.id).await {
            Ok(enrollment) => enrollment.is_some_and(|e| e.is_active),
            Err(e) => return Ok(internal_error("Failed to check enrollment", e)),
        }
    } else {
        false
    };

    // 不可见的课程与不存在的课程返回相同结果
    if !course.is_visible_to(&user, is_enrolled) {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::CourseNotFound,
            "Course not found",
        )));
    }

    let teacher_name = match storage.get_user_by_id(course.teacher_id).await {
        Ok(teacher) => teacher.map(|t| t.name),
        Err(e) => return Ok(internal_error("Failed to load course teacher", e)),
    };

    let counts = match storage.get_course_counts(course.id).await {
        Ok(counts) => counts,
        Err(e) => return Ok(internal_error("Failed to count course content", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        CourseDetailResponse {
            course,
            teacher_name,
            counts,
            is_enrolled,
        },
        "Course retrieved successfully",
    )))
}
