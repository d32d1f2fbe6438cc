use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{ApiResponse, courses::entities::CourseVisibility};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn list_categories(
    service: &CourseService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    match storage
        .list_course_categories(CourseVisibility::for_user(&user))
        .await
    {
        Ok(categories) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            categories,
            "Course categories retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list course categories", e)),
    }
}
