use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EnrollmentService;
use crate::errors::LmsError;
use crate::models::{ApiResponse, ErrorCode, enrollments::requests::EnrollRequest};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn enroll(
    service: &EnrollmentService,
    enroll_request: EnrollRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    let course = match storage.get_course_by_id(enroll_request.course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => return Ok(internal_error("Failed to load course", e)),
    };

    // 只能选已发布且已审核的课程
    if !course.is_publicly_visible() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CourseNotAvailable,
            "Course is not available for enrollment",
        )));
    }

    // 已退课的记录会被重新激活
    match storage.enroll_student(user.id, course.id).await {
        Ok(enrollment) => {
            tracing::info!("Student {} enrolled in course {}", user.id, course.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                enrollment,
                "Enrolled successfully",
            )))
        }
        Err(LmsError::Conflict(_)) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::AlreadyEnrolled,
            "Already enrolled in this course",
        ))),
        Err(e) => Ok(internal_error("Failed to enroll", e)),
    }
}
