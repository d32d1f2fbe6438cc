use serde::Deserialize;
use ts_rs::TS;

use super::entities::{CourseStatus, CourseVisibility};
use crate::models::common::PaginationQuery;

// 课程列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub category: Option<String>,
    pub teacher_id: Option<i64>,
    pub status: Option<CourseStatus>,
}

// 课程列表查询（用于存储层）
#[derive(Debug, Clone)]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub teacher_id: Option<i64>,
    pub status: Option<CourseStatus>,
    pub visibility: CourseVisibility,
}

impl CourseListQuery {
    pub fn from_params(params: CourseListParams, visibility: CourseVisibility) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            search: params.search,
            category: params.category,
            teacher_id: params.teacher_id,
            status: params.status,
            visibility,
        }
    }
}

// 创建课程请求；管理员必须通过 teacher_id 指定授课教师
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub duration: Option<i32>,
    pub price: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub teacher_id: Option<i64>,
}

// 更新课程请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration: Option<i32>,
    pub price: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub status: Option<CourseStatus>,
}

// 审核课程请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseApprovalRequest {
    pub is_approved: bool,
}

/// 校验课程字段，返回第一条错误
pub fn validate_course_fields(
    title: Option<&str>,
    category: Option<&str>,
    duration: Option<i32>,
    price: Option<f64>,
) -> Result<(), &'static str> {
    if let Some(title) = title
        && (title.trim().is_empty() || title.chars().count() > 200)
    {
        return Err("Course title must be between 1 and 200 characters");
    }
    if let Some(category) = category
        && (category.trim().is_empty() || category.chars().count() > 100)
    {
        return Err("Course category must be between 1 and 100 characters");
    }
    if let Some(duration) = duration
        && duration < 0
    {
        return Err("Course duration must not be negative");
    }
    if let Some(price) = price
        && (!price.is_finite() || price < 0.0)
    {
        return Err("Course price must not be negative");
    }
    Ok(())
}

impl CreateCourseRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_course_fields(
            Some(&self.title),
            Some(&self.category),
            self.duration,
            self.price,
        )
    }
}

impl UpdateCourseRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_course_fields(
            self.title.as_deref(),
            self.category.as_deref(),
            self.duration,
            self.price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_and_duration_must_not_be_negative() {
        assert!(validate_course_fields(None, None, Some(0), Some(0.0)).is_ok());
        assert!(validate_course_fields(None, None, Some(-1), None).is_err());
        assert!(validate_course_fields(None, None, None, Some(-0.01)).is_err());
        assert!(validate_course_fields(None, None, None, Some(f64::NAN)).is_err());
    }

    #[test]
    fn test_blank_title_rejected() {
        let req = CreateCourseRequest {
            title: "  ".into(),
            description: None,
            category: "art".into(),
            duration: None,
            price: None,
            thumbnail_url: None,
            teacher_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(UpdateCourseRequest::default().validate().is_ok());
    }
}
