use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 上传类别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/file.ts")]
pub enum UploadCategory {
    Video,
    Document,
    Attachment,
}

impl UploadCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadCategory::Video => "video",
            UploadCategory::Document => "document",
            UploadCategory::Attachment => "attachment",
        }
    }
}

impl std::fmt::Display for UploadCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UploadCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(UploadCategory::Video),
            "document" => Ok(UploadCategory::Document),
            "attachment" => Ok(UploadCategory::Attachment),
            _ => Err(format!("Invalid upload category: {s}")),
        }
    }
}

/// 引用某个上传文件的记录（用于下载权限判断）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReferences {
    /// 引用该文件的课时或作业所在课程
    pub course_ids: Vec<i64>,
    /// 引用该文件的提交：(学生ID, 课程ID)
    pub submissions: Vec<(i64, i64)>,
}

impl FileReferences {
    pub fn is_empty(&self) -> bool {
        self.course_ids.is_empty() && self.submissions.is_empty()
    }
}
