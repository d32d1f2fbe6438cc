use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{StatisticsService, aggregate};
use crate::models::ApiResponse;
use crate::services::{current_user, internal_error};
use crate::try_response;

pub async fn student_overview(
    service: &StatisticsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let storage = service.get_storage(request)?;

    let enrollments = match storage.list_enrollments_by_student(user.id).await {
        Ok(enrollments) => enrollments,
        Err(e) => return Ok(internal_error("Failed to list enrollments", e)),
    };
    let course_ids: Vec<i64> = enrollments.iter().map(|e| e.course.id).collect();

    let assignments = match storage.list_assignments_by_courses(&course_ids).await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(internal_error("Failed to list assignments", e)),
    };
    let submissions = match storage.list_submissions_by_student(user.id, None).await {
        Ok(submissions) => submissions,
        Err(e) => return Ok(internal_error("Failed to list submissions", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        aggregate::student_overview(&enrollments, &assignments, &submissions),
        "Student overview retrieved successfully",
    )))
}
