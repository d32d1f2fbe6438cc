use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::AssignmentService;
use crate::models::{ApiResponse, assignments::responses::AssignmentResponse};
use crate::services::{course_access, current_user, internal_error};
use crate::try_response;

pub async fn list_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let access = try_response!(course_access(request));
    let storage = service.get_storage(request)?;
    let course_id = access.course.id;

    let assignments = match storage.list_assignments_by_course(course_id).await {
        Ok(assignments) => assignments,
        Err(e) => return Ok(internal_error("Failed to list assignments", e)),
    };

    // 教师与管理员看提交计数，学生看自己的提交
    let items: Vec<AssignmentResponse> = if access.can_manage() {
        let mut counts = match storage.count_submissions_by_course(course_id).await {
            Ok(counts) => counts,
            Err(e) => return Ok(internal_error("Failed to count submissions", e)),
        };
        assignments
            .into_iter()
            .map(|assignment| AssignmentResponse {
                submissions: Some(counts.remove(&assignment.id).unwrap_or_default()),
                my_submission: None,
                assignment,
            })
            .collect()
    } else {
        let mine = match storage
            .list_submissions_by_student(user.id, Some(course_id))
            .await
        {
            Ok(mine) => mine,
            Err(e) => return Ok(internal_error("Failed to list own submissions", e)),
        };
        let mut by_assignment: HashMap<i64, _> = mine
            .into_iter()
            .map(|s| (s.submission.assignment_id, s.submission.summary()))
            .collect();
        assignments
            .into_iter()
            .map(|assignment| AssignmentResponse {
                submissions: None,
                my_submission: by_assignment.remove(&assignment.id),
                assignment,
            })
            .collect()
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(items, "Assignments retrieved successfully")))
}
