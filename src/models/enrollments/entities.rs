use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const MIN_PROGRESS: i32 = 0;
pub const MAX_PROGRESS: i32 = 100;

// 选课记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/enrollment.ts")]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub is_active: bool,
    pub progress: i32,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Enrollment {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// 进度变更后的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub progress: i32,
    pub completed_at: Option<i64>,
}

/// 计算新的进度与完成时间（unix 秒）
///
/// 进度被截断到 [0, 100]；达到 100 时记录完成时间，已完成的保留原时间；
/// 低于 100 时清除完成时间。
pub fn apply_progress(
    requested: i32,
    current_completed_at: Option<i64>,
    now: i64,
) -> ProgressUpdate {
    let progress = requested.clamp(MIN_PROGRESS, MAX_PROGRESS);
    let completed_at = if progress == MAX_PROGRESS {
        Some(current_completed_at.unwrap_or(now))
    } else {
        None
    };
    ProgressUpdate {
        progress,
        completed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(apply_progress(-20, None, 10).progress, 0);
        assert_eq!(apply_progress(250, None, 10).progress, 100);
        assert_eq!(apply_progress(42, None, 10).progress, 42);
    }

    #[test]
    fn test_completed_at_iff_full_progress() {
        assert_eq!(apply_progress(100, None, 10).completed_at, Some(10));
        assert_eq!(apply_progress(150, None, 10).completed_at, Some(10));
        assert_eq!(apply_progress(99, Some(5), 10).completed_at, None);
    }

    #[test]
    fn test_recompleting_keeps_original_stamp() {
        assert_eq!(apply_progress(100, Some(5), 10).completed_at, Some(5));
    }
}
