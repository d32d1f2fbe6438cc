pub mod approval;
pub mod categories;
pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod my;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    courses::{
        entities::Course,
        requests::{
            CourseApprovalRequest, CourseListParams, CreateCourseRequest, UpdateCourseRequest,
        },
    },
    users::entities::User,
};
use crate::storage::Storage;

use super::internal_error;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_courses(
        &self,
        query: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, query, request).await
    }

    pub async fn list_categories(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        categories::list_categories(self, request).await
    }

    pub async fn list_my_courses(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        my::list_my_courses(self, request).await
    }

    pub async fn get_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        detail::get_course(self, course_id, request).await
    }

    pub async fn create_course(
        &self,
        course_data: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, course_data, request).await
    }

    pub async fn update_course(
        &self,
        course_id: i64,
        update_data: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, course_id, update_data, request).await
    }

    pub async fn delete_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, course_id, request).await
    }

    pub async fn set_approval(
        &self,
        course_id: i64,
        approval: CourseApprovalRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        approval::set_approval(self, course_id, approval, request).await
    }
}

/// 读取课程并校验管理权限（本人或管理员）
pub(crate) async fn load_managed_course(
    storage: &dyn Storage,
    course_id: i64,
    user: &User,
) -> Result<Course, HttpResponse> {
    let course = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => {
            return Err(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::CourseNotFound,
                "Course not found",
            )));
        }
        Err(e) => return Err(internal_error("Failed to load course", e)),
    };

    if !course.can_be_managed_by(user) {
        tracing::info!("User {} denied management of course {}", user.id, course_id);
        return Err(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::CoursePermissionDenied,
            "Only the course teacher or an admin can do this",
        )));
    }

    Ok(course)
}
