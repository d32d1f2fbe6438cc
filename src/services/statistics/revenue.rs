use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::{StatisticsService, aggregate};
use crate::models::{
    ApiResponse, ErrorCode, courses::entities::Course, enrollments::entities::Enrollment,
    statistics::requests::MonthlyRevenueQuery,
};
use crate::services::internal_error;
use crate::storage::Storage;

async fn load_courses_and_enrollments(
    storage: &dyn Storage,
) -> Result<(Vec<Course>, Vec<Enrollment>), HttpResponse> {
    let courses = storage
        .list_all_courses()
        .await
        .map_err(|e| internal_error("Failed to list courses", e))?;
    let enrollments = storage
        .list_enrollments(None)
        .await
        .map_err(|e| internal_error("Failed to list enrollments", e))?;
    Ok((courses, enrollments))
}

pub async fn monthly_revenue(
    service: &StatisticsService,
    query: MonthlyRevenueQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let months = match query.months() {
        Ok(months) => months,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                msg,
            )));
        }
    };

    let storage = service.get_storage(request)?;
    let (courses, enrollments) = match load_courses_and_enrollments(storage.as_ref()).await {
        Ok(data) => data,
        Err(resp) => return Ok(resp),
    };

    let revenue = aggregate::monthly_revenue(
        &enrollments,
        &aggregate::price_map(&courses),
        chrono::Utc::now(),
        months,
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        revenue,
        "Monthly revenue retrieved successfully",
    )))
}

pub async fn revenue_by_teacher(
    service: &StatisticsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let (courses, enrollments) = match load_courses_and_enrollments(storage.as_ref()).await {
        Ok(data) => data,
        Err(resp) => return Ok(resp),
    };

    let mut teacher_ids: Vec<i64> = courses.iter().map(|c| c.teacher_id).collect();
    teacher_ids.sort_unstable();
    teacher_ids.dedup();

    let names: HashMap<i64, String> = match storage.list_users_by_ids(&teacher_ids).await {
        Ok(users) => users.into_iter().map(|u| (u.id, u.name)).collect(),
        Err(e) => return Ok(internal_error("Failed to load teachers", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        aggregate::revenue_by_teacher(&courses, &enrollments, &names),
        "Teacher revenue retrieved successfully",
    )))
}

pub async fn revenue_by_category(
    service: &StatisticsService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let (courses, enrollments) = match load_courses_and_enrollments(storage.as_ref()).await {
        Ok(data) => data,
        Err(resp) => return Ok(resp),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        aggregate::revenue_by_category(&courses, &enrollments),
        "Category revenue retrieved successfully",
    )))
}
