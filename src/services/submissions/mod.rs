pub mod delete;
pub mod detail;
pub mod grade;
pub mod my;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    assignments::entities::Assignment,
    courses::entities::Course,
    submissions::{
        entities::Submission,
        requests::{GradeSubmissionRequest, MySubmissionsQuery, UpdateSubmissionRequest},
    },
};
use crate::storage::Storage;

use super::internal_error;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 我的提交
    pub async fn list_my_submissions(
        &self,
        query: MySubmissionsQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        my::list_my_submissions(self, query, request).await
    }

    pub async fn get_submission(
        &self,
        submission_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, submission_id, request).await
    }

    pub async fn update_submission(
        &self,
        submission_id: i64,
        update_data: UpdateSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_submission(self, submission_id, update_data, request).await
    }

    pub async fn delete_submission(
        &self,
        submission_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_submission(self, submission_id, request).await
    }

    // 批改
    pub async fn grade_submission(
        &self,
        submission_id: i64,
        grade: GradeSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        grade::grade_submission(self, submission_id, grade, request).await
    }
}

/// 提交及其所属作业与课程
pub(crate) struct SubmissionContext {
    pub submission: Submission,
    pub assignment: Assignment,
    pub course: Course,
}

fn submission_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(
        ErrorCode::SubmissionNotFound,
        "Submission not found",
    ))
}

pub(crate) async fn load_submission_context(
    storage: &dyn Storage,
    submission_id: i64,
) -> Result<SubmissionContext, HttpResponse> {
    let submission = match storage.get_submission_by_id(submission_id).await {
        Ok(Some(submission)) => submission,
        Ok(None) => return Err(submission_not_found()),
        Err(e) => return Err(internal_error("Failed to load submission", e)),
    };

    let assignment = match storage.get_assignment_by_id(submission.assignment_id).await {
        Ok(Some(assignment)) => assignment,
        Ok(None) => return Err(submission_not_found()),
        Err(e) => return Err(internal_error("Failed to load assignment", e)),
    };

    let course = match storage.get_course_by_id(assignment.course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Err(submission_not_found()),
        Err(e) => return Err(internal_error("Failed to load course", e)),
    };

    Ok(SubmissionContext {
        submission,
        assignment,
        course,
    })
}
