use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StatisticsService, aggregate};
use crate::models::{ApiResponse, statistics::responses::TeacherOverview};
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn teacher_overview(
    service: &StatisticsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    let courses = match storage.list_courses_by_teacher(user.id).await {
        Ok(courses) => courses,
        Err(e) => return Ok(internal_error("Failed to list teacher courses", e)),
    };
    let course_ids: Vec<i64> = courses.iter().map(|c| c.id).collect();

    let enrollments = match storage.list_enrollments(Some(course_ids.as_slice())).await {
        Ok(enrollments) => enrollments,
        Err(e) => return Ok(internal_error("Failed to list enrollments", e)),
    };
    let pending_grading = match storage
        .count_ungraded_submissions_by_courses(&course_ids)
        .await
    {
        Ok(count) => count,
        Err(e) => return Ok(internal_error("Failed to count ungraded submissions", e)),
    };

    let performances: Vec<_> = courses
        .iter()
        .map(|course| aggregate::course_performance(course, &enrollments))
        .collect();

    let overview = TeacherOverview {
        course_count: courses.len() as u64,
        total_students: aggregate::distinct_active_students(&enrollments),
        total_revenue: aggregate::round2(performances.iter().map(|p| p.revenue).sum()),
        pending_grading,
        courses: performances,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        overview,
        "Teacher overview retrieved successfully",
    )))
}
