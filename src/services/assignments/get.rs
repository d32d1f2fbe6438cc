use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, load_course_assignment};
use crate::models::{ApiResponse, assignments::responses::AssignmentResponse};
use crate::services::{course_access, current_user, internal_error};
use crate::try_response;

pub async fn get_assignment(
    service: &AssignmentService,
    assignment_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = try_response!(current_user(request));
    let access = try_response!(course_access(request));
    let storage = service.get_storage(request)?;

    let assignment = try_response!(
        load_course_assignment(storage.as_ref(), access.course.id, assignment_id).await
    );

    let response = if access.can_manage() {
        let counts = match storage.count_submissions_by_course(access.course.id).await {
            Ok(counts) => counts.get(&assignment.id).copied().unwrap_or_default(),
            Err(e) => return Ok(internal_error("Failed to count submissions", e)),
        };
        AssignmentResponse {
            assignment,
            submissions: Some(counts),
            my_submission: None,
        }
    } else {
        let mine = match storage
            .get_submission_by_assignment_and_student(assignment.id, user.id)
            .await
        {
            Ok(mine) => mine,
            Err(e) => return Ok(internal_error("Failed to load own submission", e)),
        };
        AssignmentResponse {
            assignment,
            submissions: None,
            my_submission: mine.map(|s| s.summary()),
        }
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Assignment retrieved successfully")))
}
