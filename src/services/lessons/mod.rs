pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod reorder;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::lessons::requests::{
    CreateLessonRequest, ReorderLessonsRequest, UpdateLessonRequest,
};
use crate::storage::Storage;

/// 课时服务；课程由 RequireCourseAccess 解析后放入请求扩展
pub struct LessonService {
    storage: Option<Arc<dyn Storage>>,
}

impl LessonService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_lessons(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_lessons(self, request).await
    }

    pub async fn get_lesson(
        &self,
        lesson_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        get::get_lesson(self, lesson_id, request).await
    }

    pub async fn create_lesson(
        &self,
        lesson_data: CreateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_lesson(self, lesson_data, request).await
    }

    pub async fn update_lesson(
        &self,
        lesson_id: i64,
        update_data: UpdateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_lesson(self, lesson_id, update_data, request).await
    }

    pub async fn delete_lesson(
        &self,
        lesson_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        delete::delete_lesson(self, lesson_id, request).await
    }

    pub async fn reorder_lessons(
        &self,
        reorder: ReorderLessonsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        reorder::reorder_lessons(self, reorder, request).await
    }
}
