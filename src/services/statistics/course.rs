use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StatisticsService, aggregate};
use crate::models::{ApiResponse, statistics::responses::CourseStatistics};
use crate::services::{internal_error, require_course_manager};
use crate::try_response;

pub async fn course_statistics(
    service: &StatisticsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let access = try_response!(require_course_manager(request));
    let course = access.course;
    let storage = service.get_storage(request)?;

    let enrollments = match storage
        .list_enrollments(Some(std::slice::from_ref(&course.id)))
        .await
    {
        Ok(enrollments) => enrollments,
        Err(e) => return Ok(internal_error("Failed to list enrollments", e)),
    };
    let assignments = match storage.list_assignments_by_course(course.id).await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(internal_error("Failed to list assignments", e)),
    };
    let assignment_ids: Vec<i64> = assignments.iter().map(|a| a.id).collect();
    let submissions = match storage
        .list_submissions_by_assignments(&assignment_ids)
        .await
    {
        Ok(submissions) => submissions,
        Err(e) => return Ok(internal_error("Failed to list submissions", e)),
    };

    let performance = aggregate::course_performance(&course, &enrollments);
    let enrolled = performance.active_enrollments;
    let statistics = CourseStatistics {
        assignments: assignments
            .iter()
            .map(|a| aggregate::assignment_statistics(a, &submissions, enrolled))
            .collect(),
        performance,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        statistics,
        "Course statistics retrieved successfully",
    )))
}
