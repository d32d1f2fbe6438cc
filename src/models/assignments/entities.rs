use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 作业实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub max_score: f64,
    pub attachments: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assignment {
    /// 在给定时间提交是否算迟交
    pub fn is_late_at(&self, at: chrono::DateTime<chrono::Utc>) -> bool {
        self.due_date.is_some_and(|due| at > due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn assignment(due_date: Option<chrono::DateTime<Utc>>) -> Assignment {
        Assignment {
            id: 1,
            course_id: 1,
            title: "hw".into(),
            description: None,
            due_date,
            max_score: 100.0,
            attachments: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_late_only_after_due_date() {
        let now = Utc::now();
        assert!(!assignment(None).is_late_at(now));
        assert!(!assignment(Some(now + Duration::hours(1))).is_late_at(now));
        assert!(!assignment(Some(now)).is_late_at(now));
        assert!(assignment(Some(now - Duration::seconds(1))).is_late_at(now));
    }
}
