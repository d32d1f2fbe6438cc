use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 240;
pub const DEFAULT_DURATION_MINUTES: i32 = 30;

// 答疑预约
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/consultation.ts")]
pub struct Consultation {
    pub id: i64,
    pub teacher_id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub duration_minutes: i32,
    pub topic: Option<String>,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Consultation {
    pub fn involves(&self, user_id: i64) -> bool {
        self.teacher_id == user_id || self.student_id == user_id
    }
}

/// 预约时间必须在未来，时长 15–240 分钟
pub fn validate_schedule(
    scheduled_at: chrono::DateTime<chrono::Utc>,
    duration_minutes: i32,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(), &'static str> {
    if scheduled_at <= now {
        return Err("Consultation must be scheduled in the future");
    }
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err("Consultation duration must be between 15 and 240 minutes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_schedule_rules() {
        let now = Utc::now();
        let later = now + Duration::hours(2);
        assert!(validate_schedule(later, 30, now).is_ok());
        assert!(validate_schedule(now, 30, now).is_err());
        assert!(validate_schedule(now - Duration::minutes(1), 30, now).is_err());
        assert!(validate_schedule(later, 14, now).is_err());
        assert!(validate_schedule(later, 241, now).is_err());
        assert!(validate_schedule(later, 240, now).is_ok());
    }
}
