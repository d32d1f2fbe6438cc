use serde::Serialize;
use ts_rs::TS;

use super::entities::Assignment;

// 学生视角：本人提交概况
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct MySubmissionSummary {
    pub submission_id: i64,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub is_late: bool,
    pub score: Option<f64>,
    pub graded: bool,
}

// 作业提交计数（存储层聚合结果）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct SubmissionCounts {
    pub submission_count: u64,
    pub graded_count: u64,
}

// 作业列表/详情项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assignment: Assignment,
    /// 课程负责人与管理员可见
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submissions: Option<SubmissionCounts>,
    /// 学生可见
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_submission: Option<MySubmissionSummary>,
}
