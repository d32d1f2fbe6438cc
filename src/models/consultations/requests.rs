use serde::Deserialize;
use ts_rs::TS;

// 预约答疑：教师需指定 student_id，学生预约时由课程确定教师
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/consultation.ts")]
pub struct CreateConsultationRequest {
    pub course_id: i64,
    pub student_id: Option<i64>,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub duration_minutes: Option<i32>,
    pub topic: Option<String>,
    pub notes: Option<String>,
}

/// 存储层筛选条件，全部为空时返回所有记录
#[derive(Debug, Clone, Default)]
pub struct ConsultationFilter {
    pub teacher_id: Option<i64>,
    pub student_id: Option<i64>,
}

/// 存储层新建参数
#[derive(Debug, Clone)]
pub struct NewConsultation {
    pub teacher_id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub duration_minutes: i32,
    pub topic: Option<String>,
    pub notes: Option<String>,
}
