use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{ApiResponse, users::entities::UserRole};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn list_my_courses(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    // 教师：自己的课程；学生：有效选课；管理员：全部
    let courses = match user.role {
        UserRole::Teacher => storage.list_courses_by_teacher(user.id).await,
        UserRole::Student => storage.list_enrolled_courses(user.id).await,
        UserRole::Admin => storage.list_all_courses().await,
    };

    match courses {
        Ok(courses) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            courses,
            "Courses retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list my courses", e)),
    }
}
