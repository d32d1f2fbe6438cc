use serde::Serialize;
use ts_rs::TS;

use super::entities::Course;
use crate::models::common::PaginationInfo;

// 列表项：课程 + 教师姓名
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseListItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub course: Course,
    pub teacher_name: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseListResponse {
    pub items: Vec<CourseListItem>,
    pub pagination: PaginationInfo,
}

// 课程下的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseCounts {
    pub lesson_count: u64,
    pub assignment_count: u64,
    pub student_count: u64,
}

// 课程详情
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub course: Course,
    pub teacher_name: Option<String>,
    #[serde(flatten)]
    #[ts(flatten)]
    pub counts: CourseCounts,
    pub is_enrolled: bool,
}
