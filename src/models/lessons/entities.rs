use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课时实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct Lesson {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub attachments: Vec<String>,
    pub order_index: i32,
    pub duration_minutes: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
