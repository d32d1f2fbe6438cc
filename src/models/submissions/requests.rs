use serde::Deserialize;
use ts_rs::TS;

// 修改提交（仅评分前）
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct UpdateSubmissionRequest {
    pub content: Option<String>,
    pub attachments: Option<Vec<String>>,
}

// 评分请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct GradeSubmissionRequest {
    pub score: f64,
    pub feedback: Option<String>,
}

// 我的提交查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct MySubmissionsQuery {
    pub course_id: Option<i64>,
}
