use serde::Serialize;
use ts_rs::TS;

use super::entities::Submission;

// 教师查看作业提交列表时附带学生信息
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionWithStudent {
    #[serde(flatten)]
    #[ts(flatten)]
    pub submission: Submission,
    pub student_name: String,
    pub student_email: String,
}

// 提交 + 所属作业信息（学生列表与详情共用）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionWithAssignment {
    #[serde(flatten)]
    #[ts(flatten)]
    pub submission: Submission,
    pub assignment_title: String,
    pub course_id: i64,
    pub max_score: f64,
}
