use serde::Serialize;
use ts_rs::TS;

use super::entities::UploadCategory;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/file.ts")]
pub struct FileUploadResponse {
    /// 相对路径 {category}/{user_id}/{file}
    pub path: String,
    /// 下载地址
    pub url: String,
    /// 原始文件名
    pub file_name: String,
    /// 文件大小(字节)
    pub size: i64,
    pub category: UploadCategory,
    pub content_type: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}
