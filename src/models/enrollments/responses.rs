use serde::Serialize;
use ts_rs::TS;

use super::entities::Enrollment;
use crate::models::courses::entities::Course;

// 我的选课：选课记录 + 课程
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct EnrollmentWithCourse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub enrollment: Enrollment,
    pub course: Course,
}

// 当前学生在某课程的选课状态
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct EnrollmentStatusResponse {
    pub is_enrolled: bool,
    pub enrollment: Option<Enrollment>,
}

// 课程学生名单
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct EnrolledStudent {
    #[serde(flatten)]
    #[ts(flatten)]
    pub enrollment: Enrollment,
    pub student_name: String,
    pub student_email: String,
}
