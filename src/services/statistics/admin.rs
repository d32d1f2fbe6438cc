use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StatisticsService, aggregate};
use crate::models::{ApiResponse, statistics::responses::AdminOverview};
use crate::services::internal_error;

pub async fn admin_overview(
    service: &StatisticsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let users = match storage.count_users_by_role().await {
        Ok(counts) => counts,
        Err(e) => return Ok(internal_error("Failed to count users", e)),
    };
    let courses = match storage.list_all_courses().await {
        Ok(courses) => courses,
        Err(e) => return Ok(internal_error("Failed to list courses", e)),
    };
    let enrollments = match storage.list_enrollments(None).await {
        Ok(enrollments) => enrollments,
        Err(e) => return Ok(internal_error("Failed to list enrollments", e)),
    };

    let enrollment_counts = aggregate::enrollment_counts(&enrollments);
    let overview = AdminOverview {
        users,
        courses: aggregate::course_counts(&courses),
        completion_rate: aggregate::completion_rate(&enrollment_counts),
        enrollments: enrollment_counts,
        total_revenue: aggregate::total_revenue(&enrollments, &aggregate::price_map(&courses)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        overview,
        "Platform overview retrieved successfully",
    )))
}
