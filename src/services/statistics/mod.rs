pub mod admin;
pub mod aggregate;
pub mod course;
pub mod revenue;
pub mod student;
pub mod teacher;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::statistics::requests::MonthlyRevenueQuery;
use crate::storage::Storage;

pub struct StatisticsService {
    storage: Option<Arc<dyn Storage>>,
}

impl StatisticsService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 平台总览
    pub async fn admin_overview(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        admin::admin_overview(self, request).await
    }

    // 月度收入
    pub async fn monthly_revenue(
        &self,
        query: MonthlyRevenueQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        revenue::monthly_revenue(self, query, request).await
    }

    // 教师收入排行
    pub async fn revenue_by_teacher(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        revenue::revenue_by_teacher(self, request).await
    }

    // 分类收入
    pub async fn revenue_by_category(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        revenue::revenue_by_category(self, request).await
    }

    // 教师总览
    pub async fn teacher_overview(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        teacher::teacher_overview(self, request).await
    }

    // 学生总览
    pub async fn student_overview(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        student::student_overview(self, request).await
    }

    // 课程统计
    pub async fn course_statistics(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        course::course_statistics(self, request).await
    }
}
