pub mod enroll;
pub mod my;
pub mod progress;
pub mod status;
pub mod students;
pub mod unenroll;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::enrollments::requests::{EnrollRequest, UpdateProgressRequest};
use crate::storage::Storage;

pub struct EnrollmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl EnrollmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 选课
    pub async fn enroll(
        &self,
        enroll_request: EnrollRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enroll::enroll(self, enroll_request, request).await
    }

    // 我的选课
    pub async fn list_my_enrollments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        my::list_my_enrollments(self, request).await
    }

    // 当前学生在某课程的选课状态
    pub async fn get_status(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        status::get_status(self, course_id, request).await
    }

    // 更新学习进度
    pub async fn update_progress(
        &self,
        course_id: i64,
        progress: UpdateProgressRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        progress::update_progress(self, course_id, progress, request).await
    }

    // 退课
    pub async fn unenroll(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        unenroll::unenroll(self, course_id, request).await
    }

    // 课程学生名单
    pub async fn list_students(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        students::list_students(self, request).await
    }
}
