use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CourseService;
use crate::models::{
    ApiResponse,
    courses::{
        entities::CourseVisibility,
        requests::{CourseListParams, CourseListQuery},
    },
};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn list_courses(
    service: &CourseService,
    query: CourseListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    // 非管理员只能看到已发布且已审核的课程，教师额外可见自己的课程
    let list_query = CourseListQuery::from_params(query, CourseVisibility::for_user(&user));

    match storage.list_courses_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Course list retrieved successfully",
        ))),
        Err(e) => Ok(internal_error("Failed to list courses", e)),
    }
}
