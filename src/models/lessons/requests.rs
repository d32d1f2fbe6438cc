use serde::Deserialize;
use std::collections::HashSet;
use ts_rs::TS;

// 创建课时请求，order_index 缺省时追加到末尾
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct CreateLessonRequest {
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub attachments: Option<Vec<String>>,
    pub order_index: Option<i32>,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub attachments: Option<Vec<String>>,
    pub order_index: Option<i32>,
    pub duration_minutes: Option<i32>,
}

// 重新排序：课程下全部课时 ID 的新顺序
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct ReorderLessonsRequest {
    pub lesson_ids: Vec<i64>,
}

fn validate_lesson_fields(
    title: Option<&str>,
    order_index: Option<i32>,
    duration_minutes: Option<i32>,
) -> Result<(), &'static str> {
    if let Some(title) = title
        && (title.trim().is_empty() || title.chars().count() > 200)
    {
        return Err("Lesson title must be between 1 and 200 characters");
    }
    if let Some(order_index) = order_index
        && order_index < 0
    {
        return Err("Lesson order_index must not be negative");
    }
    if let Some(duration) = duration_minutes
        && duration < 0
    {
        return Err("Lesson duration must not be negative");
    }
    Ok(())
}

impl CreateLessonRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_lesson_fields(Some(&self.title), self.order_index, self.duration_minutes)
    }
}

impl UpdateLessonRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_lesson_fields(
            self.title.as_deref(),
            self.order_index,
            self.duration_minutes,
        )
    }
}

/// 新顺序必须恰好是现有课时 ID 的一个排列
pub fn is_full_permutation(existing: &[i64], requested: &[i64]) -> bool {
    if existing.len() != requested.len() {
        return false;
    }
    let existing: HashSet<i64> = existing.iter().copied().collect();
    let mut seen = HashSet::with_capacity(requested.len());
    requested
        .iter()
        .all(|id| existing.contains(id) && seen.insert(*id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutation_accepts_reordering() {
        assert!(is_full_permutation(&[1, 2, 3], &[3, 1, 2]));
        assert!(is_full_permutation(&[], &[]));
    }

    #[test]
    fn test_permutation_rejects_missing_extra_and_duplicates() {
        assert!(!is_full_permutation(&[1, 2, 3], &[1, 2]));
        assert!(!is_full_permutation(&[1, 2, 3], &[1, 2, 4]));
        assert!(!is_full_permutation(&[1, 2, 3], &[1, 1, 2]));
        assert!(!is_full_permutation(&[1, 2], &[1, 2, 3]));
    }

    #[test]
    fn test_lesson_validation() {
        let req = UpdateLessonRequest {
            order_index: Some(-1),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        assert!(UpdateLessonRequest::default().validate().is_ok());
    }
}
