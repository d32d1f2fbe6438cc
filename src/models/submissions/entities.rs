use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::assignments::responses::MySubmissionSummary;

// 提交实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub content: Option<String>,
    pub attachments: Vec<String>,
    pub is_late: bool,
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
    pub graded_by_teacher_id: Option<i64>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.graded_at.is_some()
    }

    pub fn summary(&self) -> MySubmissionSummary {
        MySubmissionSummary {
            submission_id: self.id,
            submitted_at: self.submitted_at,
            is_late: self.is_late,
            score: self.score,
            graded: self.is_graded(),
        }
    }
}

/// 分数必须落在 [0, max_score]
pub fn validate_score(score: f64, max_score: f64) -> Result<(), String> {
    if !score.is_finite() {
        return Err("Score must be a finite number".to_string());
    }
    if score < 0.0 {
        return Err("Score must not be negative".to_string());
    }
    if score > max_score {
        return Err(format!("Score must not exceed max score {max_score}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert!(validate_score(0.0, 100.0).is_ok());
        assert!(validate_score(100.0, 100.0).is_ok());
        assert!(validate_score(100.5, 100.0).is_err());
        assert!(validate_score(-1.0, 100.0).is_err());
        assert!(validate_score(f64::INFINITY, 100.0).is_err());
    }
}
