use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiResponse, ErrorCode, courses::requests::CreateCourseRequest, users::entities::UserRole,
};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn create_course(
    service: &CourseService,
    course_data: CreateCourseRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));

    if let Err(msg) = course_data.validate() {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::CourseInvalid, msg)));
    }

    let storage = service.get_storage(request)?;

    // 教师只能为自己创建；管理员必须指定一位教师
    let teacher_id = match user.role {
        UserRole::Teacher => user.id,
        UserRole::Admin => {
            let Some(teacher_id) = course_data.teacher_id else {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::CourseInvalid,
                    "teacher_id is required when an admin creates a course",
                )));
            };
            match storage.get_user_by_id(teacher_id).await {
                Ok(Some(teacher)) if teacher.role == UserRole::Teacher => teacher.id,
                Ok(_) => {
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::CourseInvalid,
                        "teacher_id must refer to a TEACHER",
                    )));
                }
                Err(e) => return Ok(internal_error("Failed to load course teacher", e)),
            }
        }
        UserRole::Student => {
            return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                ErrorCode::Forbidden,
                "Students cannot create courses",
            )));
        }
    };

    match storage.create_course(teacher_id, course_data).await {
        Ok(course) => {
            tracing::info!("Course {} created for teacher {}", course.id, teacher_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                course,
                "Course created successfully",
            )))
        }
        Err(e) => Ok(internal_error("Failed to create course", e)),
    }
}
